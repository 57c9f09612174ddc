//! Errors raised while building or querying the model arena.

use thiserror::Error;

use crate::identifier::XmiId;

/// Structural invariant violations of the UML model.
///
/// Dangling cross references are not errors; they resolve to `None`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// A classification declares more than one direct supertype.
    #[error("class `{class}` has {count} supertypes, at most one is allowed")]
    MultipleSupertypes { class: XmiId, count: usize },

    #[error("model root `{0}` is not a package in the model")]
    MissingRoot(XmiId),

    /// The parent chain starting at this entity loops back on itself.
    #[error("parent chain of `{0}` contains a cycle")]
    ParentCycle(XmiId),

    /// A package or classification other than the root has no resolvable parent.
    #[error("`{0}` has no parent package")]
    Orphan(XmiId),
}
