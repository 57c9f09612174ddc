//! Loading state of the model for the selected version.
//!
//! A [`ModelSession`] tracks which version is requested and what came back.
//! Every load is identified by a [`LoadTicket`]; completing a load with a
//! ticket that is no longer the latest discards the result, so the last
//! request always wins and results are never merged.

use std::rc::Rc;

use log::{debug, info, warn};

use umlmap_core::semantic::Model;

use crate::error::UmlmapError;

/// Why a load failed, for callers that present different messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadErrorKind {
    /// The requested version does not exist.
    VersionNotFound,
    Other,
}

/// A failed load: its kind and a human readable description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    kind: LoadErrorKind,
    message: String,
}

impl LoadFailure {
    pub fn new(kind: LoadErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> LoadErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<&UmlmapError> for LoadFailure {
    fn from(error: &UmlmapError) -> Self {
        let kind = if error.is_not_found() {
            LoadErrorKind::VersionNotFound
        } else {
            LoadErrorKind::Other
        };
        Self::new(kind, error.to_string())
    }
}

/// Where the session is in loading a version.
#[derive(Debug, Clone, Default)]
pub enum ModelState {
    #[default]
    NotLoaded,
    Loading {
        version: String,
    },
    Loaded {
        version: String,
        model: Rc<Model>,
    },
    Failed {
        version: String,
        failure: LoadFailure,
    },
}

/// Identifies one load request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    version: String,
}

impl LoadTicket {
    pub fn version(&self) -> &str {
        &self.version
    }
}

/// The model of the currently selected version.
#[derive(Debug, Default)]
pub struct ModelSession {
    state: ModelState,
    generation: u64,
}

impl ModelSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ModelState {
        &self.state
    }

    /// The loaded model, if the latest load succeeded.
    pub fn model(&self) -> Option<&Rc<Model>> {
        match &self.state {
            ModelState::Loaded { model, .. } => Some(model),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, ModelState::Loading { .. })
    }

    /// Starts loading `version`; any load still in flight becomes stale.
    pub fn begin_load(&mut self, version: &str) -> LoadTicket {
        self.generation += 1;
        info!(version = version, generation = self.generation; "Loading model");
        self.state = ModelState::Loading {
            version: version.to_string(),
        };
        LoadTicket {
            generation: self.generation,
            version: version.to_string(),
        }
    }

    /// Completes the load identified by `ticket`.
    ///
    /// Returns the new model when the ticket is current and the load
    /// succeeded. Stale tickets are ignored and leave the state untouched.
    pub fn complete(
        &mut self,
        ticket: LoadTicket,
        result: Result<Model, LoadFailure>,
    ) -> Option<Rc<Model>> {
        if ticket.generation != self.generation {
            debug!(
                version = ticket.version.as_str(),
                generation = ticket.generation,
                current = self.generation;
                "Discarding stale load"
            );
            return None;
        }
        match result {
            Ok(model) => {
                let model = Rc::new(model);
                info!(version = ticket.version.as_str(), entities = model.len(); "Model loaded");
                self.state = ModelState::Loaded {
                    version: ticket.version,
                    model: Rc::clone(&model),
                };
                Some(model)
            }
            Err(failure) => {
                warn!(
                    version = ticket.version.as_str(),
                    kind:? = failure.kind(),
                    message = failure.message();
                    "Model failed to load"
                );
                self.state = ModelState::Failed {
                    version: ticket.version,
                    failure,
                };
                None
            }
        }
    }
}
