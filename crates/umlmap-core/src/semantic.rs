//! Semantic UML model types.
//!
//! This module holds the typed representation of an Enterprise Architect
//! model after mapping from its XMI export.
//!
//! # Pipeline Position
//!
//! ```text
//! XMI (XML or JSON)
//!     ↓ umlmap-parser
//! Model arena (these types)
//!     ↓ filter
//! Visible working set
//!     ↓ layout
//! Positioned nodes
//!     ↓ export
//! SVG / JSON
//! ```
//!
//! # Organization
//!
//! - [`entity`] - The closed set of entity variants: [`Entity`], [`Package`],
//!   [`Classification`], [`Attribute`], [`Association`], [`Generalization`]
//! - [`class_type`] - [`ClassType`], the precomputed rendering category of a class
//! - [`model`] - The [`Model`] arena and its [`ModelBuilder`]
//! - [`error`] - [`ModelError`]

pub mod class_type;
pub mod entity;
pub mod error;
pub mod model;

pub use class_type::*;
pub use entity::*;
pub use error::*;
pub use model::*;
