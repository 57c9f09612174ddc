//! Force-directed layout.
//!
//! The layout runs as a velocity-Verlet simulation over a working set of
//! visible nodes. Each tick cools the simulation's energy (`alpha`), lets
//! every [`Force`] adjust node velocities, then integrates positions.
//!
//! ```text
//! Model + SearchContext
//!     ↓ WorkingSet::build
//! nodes, relation links, containment links
//!     ↓ Simulation::tick (link → group → collide → charge → center → bounds)
//! positions
//! ```
//!
//! - [`working_set`] - Visible nodes and the edges between them
//! - [`force`] - The [`Force`] trait and the built-in forces
//! - [`simulation`] - [`Simulation`]: cooling, integration, pinning
//! - [`scheduler`] - Frame cadence and debouncing

pub mod force;
pub mod scheduler;
pub mod simulation;
pub mod working_set;

pub use force::{Force, TickContext};
pub use scheduler::{Debouncer, FrameScheduler};
pub use simulation::Simulation;
pub use working_set::{LayoutLink, LayoutNode, LinkKind, NodeKind, NodeSizer, WorkingSet};
