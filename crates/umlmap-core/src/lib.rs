//! umlmap Core Types and Definitions
//!
//! This crate provides the foundational types shared by the umlmap crates:
//!
//! - **Identifiers**: Interned `xmi:id` handles ([`identifier::XmiId`]) and derived class ids
//! - **Colors**: CSS colors and the stereotype palette ([`color`] module)
//! - **Geometry**: Points, sizes and rectangles ([`geometry`] module)
//! - **Documentation**: Cleaning of Enterprise Architect notes ([`documentation`] module)
//! - **Semantic**: The UML model arena ([`semantic`] module)

pub mod color;
pub mod documentation;
pub mod geometry;
pub mod identifier;
pub mod semantic;
