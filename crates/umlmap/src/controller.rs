//! The single execution context that owns the running diagram.
//!
//! Every external input (resize, drag, legend toggles, search edits, frame
//! callbacks) arrives as an [`Event`] through [`DiagramController::handle`].
//! Handling is strictly sequential, so node positions are only ever mutated
//! from one place. Replacing the model stops the running simulation before a
//! fresh one is built.

use std::{collections::HashSet, rc::Rc, time::Instant};

use log::{debug, info, trace};

use umlmap_core::{
    geometry::{Point, Size},
    identifier::XmiId,
    semantic::Model,
};

use crate::{
    config::{AppConfig, LayoutConfig},
    error::UmlmapError,
    filter::SearchContext,
    layout::{Debouncer, FrameScheduler, NodeSizer, Simulation, WorkingSet},
};

/// Inputs the controller reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Resize(Size),
    DragStart { id: XmiId, position: Point },
    Drag { id: XmiId, position: Point },
    DragEnd { id: XmiId },
    /// Shows or hides the nodes of a stereotype; applied after a debounce.
    ToggleLegend(XmiId),
    SetSearch(String),
    SetSticky(bool),
    /// An animation frame; runs the ticks that are due.
    Frame,
}

/// Owns the model, the search, the hidden stereotypes and the simulation.
pub struct DiagramController {
    config: LayoutConfig,
    sizer: NodeSizer,
    model: Option<Rc<Model>>,
    search: SearchContext,
    hidden: HashSet<XmiId>,
    /// Hidden stereotypes the current working set was built with.
    applied_hidden: HashSet<XmiId>,
    simulation: Option<Simulation>,
    frames: FrameScheduler,
    debouncer: Debouncer,
}

impl DiagramController {
    pub fn new(config: &AppConfig) -> Self {
        let layout = config.layout().clone();
        Self {
            sizer: NodeSizer::new(config.style()),
            frames: FrameScheduler::new(layout.tick_interval()),
            debouncer: Debouncer::new(layout.debounce()),
            config: layout,
            model: None,
            search: SearchContext::default(),
            hidden: HashSet::new(),
            applied_hidden: HashSet::new(),
            simulation: None,
        }
    }

    pub fn model(&self) -> Option<&Rc<Model>> {
        self.model.as_ref()
    }

    pub fn search(&self) -> &SearchContext {
        &self.search
    }

    pub fn simulation(&self) -> Option<&Simulation> {
        self.simulation.as_ref()
    }

    /// Stereotypes currently hidden through the legend.
    pub fn hidden_stereotypes(&self) -> &HashSet<XmiId> {
        &self.hidden
    }

    /// Installs a new model and starts a fresh simulation.
    ///
    /// The previous simulation is stopped and discarded first. The search
    /// string is kept; cached visibility and hidden stereotypes are not.
    ///
    /// # Errors
    ///
    /// Propagates model errors from the initial visibility evaluation.
    pub fn replace_model(&mut self, model: Rc<Model>) -> Result<(), UmlmapError> {
        if let Some(simulation) = self.simulation.as_mut() {
            simulation.stop();
        }
        self.simulation = None;
        self.debouncer.cancel();
        self.frames.reset();
        self.search.reset();
        self.hidden.clear();
        self.applied_hidden.clear();

        info!(entities = model.len(); "Replacing model");
        self.model = Some(model);
        self.rebuild()
    }

    /// Handles one event at time `now`.
    ///
    /// Events that need a model are ignored until one is installed.
    ///
    /// # Errors
    ///
    /// Propagates model errors raised while recomputing visibility. The
    /// search or legend change that caused the error is rolled back, so the
    /// same input fails again instead of being treated as already applied.
    pub fn handle(&mut self, event: Event, now: Instant) -> Result<(), UmlmapError> {
        trace!(event:? = event; "Handling event");
        match event {
            Event::Resize(size) => {
                self.config = self.config.clone().with_canvas(size);
                if let Some(simulation) = self.simulation.as_mut() {
                    simulation.resize(size);
                }
            }
            Event::DragStart { id, position } => {
                let target = self.config.drag_alpha_target();
                if let Some(simulation) = self.simulation.as_mut() {
                    simulation.set_alpha_target(target);
                    simulation.resume();
                    simulation.pin(id, position);
                }
            }
            Event::Drag { id, position } => {
                if let Some(simulation) = self.simulation.as_mut() {
                    simulation.pin(id, position);
                }
            }
            Event::DragEnd { id } => {
                if let Some(simulation) = self.simulation.as_mut() {
                    simulation.set_alpha_target(0.0);
                    if !simulation.is_sticky() {
                        simulation.unpin(id);
                    }
                }
            }
            Event::ToggleLegend(stereotype) => {
                if !self.hidden.remove(&stereotype) {
                    self.hidden.insert(stereotype);
                }
                self.debouncer.trigger(now);
            }
            Event::SetSearch(search) => {
                let previous = self.search.search().to_string();
                if self.search.set_search(&search) {
                    if let Err(err) = self.rebuild() {
                        self.search.set_search(&previous);
                        return Err(err);
                    }
                }
            }
            Event::SetSticky(sticky) => {
                self.config = self.config.clone().with_sticky(sticky);
                if let Some(simulation) = self.simulation.as_mut() {
                    simulation.set_sticky(sticky);
                }
            }
            Event::Frame => {
                if self.debouncer.poll(now) {
                    if let Err(err) = self.rebuild() {
                        self.hidden = self.applied_hidden.clone();
                        return Err(err);
                    }
                }
                let due = self.frames.due_ticks(now);
                if let Some(simulation) = self.simulation.as_mut() {
                    for _ in 0..due {
                        if !simulation.step() {
                            break;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Recomputes the working set and hands it to the simulation, creating
    /// the simulation on first use.
    fn rebuild(&mut self) -> Result<(), UmlmapError> {
        let Some(model) = self.model.as_ref() else {
            return Ok(());
        };
        let set = WorkingSet::build(model, &self.search, &self.hidden, &self.sizer, &self.config)?;
        debug!(nodes = set.len(), search = self.search.search(); "Rebuilt working set");

        match self.simulation.as_mut() {
            Some(simulation) => simulation.set_working_set(set),
            None => self.simulation = Some(Simulation::new(set, &self.config)),
        }
        self.applied_hidden = self.hidden.clone();
        Ok(())
    }
}
