//! The simulation clock: cooling, force application and integration.

use std::{
    collections::HashSet,
    f32::consts::PI,
};

use log::{debug, trace};
use rand::Rng;

use umlmap_core::{
    geometry::{Point, Size},
    identifier::XmiId,
};

use super::{
    force::{Force, TickContext, default_forces},
    working_set::{LayoutNode, NodeKind, WorkingSet},
};
use crate::config::LayoutConfig;

const INITIAL_RADIUS: f32 = 10.0;

/// A force-directed simulation over one [`WorkingSet`].
///
/// Every tick moves `alpha` towards `alpha_target` by `alpha_decay`, applies
/// the forces in order, then integrates: `v *= 1 - velocity_decay; x += v`.
/// Pinned nodes are held at their pin. The simulation stops once alpha drops
/// below `alpha_min`; in sticky mode every node is pinned at that point.
pub struct Simulation {
    set: WorkingSet,
    forces: Vec<Box<dyn Force>>,
    canvas: Size,

    alpha: f32,
    alpha_min: f32,
    alpha_decay: f32,
    alpha_target: f32,
    velocity_decay: f32,
    filter_reheat: f32,

    sticky: bool,
    running: bool,
    ticks: usize,
}

impl Simulation {
    /// Creates a running simulation with the standard force chain.
    pub fn new(set: WorkingSet, config: &LayoutConfig) -> Self {
        Self::with_forces(set, config, default_forces(config))
    }

    /// Creates a running simulation with a custom force chain.
    pub fn with_forces(
        set: WorkingSet,
        config: &LayoutConfig,
        forces: Vec<Box<dyn Force>>,
    ) -> Self {
        let mut simulation = Self {
            set,
            forces,
            canvas: config.canvas(),
            alpha: 1.0,
            alpha_min: config.alpha_min(),
            alpha_decay: config.alpha_decay(),
            alpha_target: 0.0,
            velocity_decay: config.velocity_decay(),
            filter_reheat: config.filter_reheat(),
            sticky: config.sticky(),
            running: true,
            ticks: 0,
        };
        simulation.place_new_nodes();
        simulation.initialize_forces();
        debug!(
            nodes = simulation.set.len(),
            links = simulation.set.links().len(),
            forces = simulation.forces.len();
            "Simulation created"
        );
        simulation
    }

    pub fn working_set(&self) -> &WorkingSet {
        &self.set
    }

    pub fn nodes(&self) -> &[LayoutNode] {
        self.set.nodes()
    }

    pub fn canvas(&self) -> Size {
        self.canvas
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Returns `true` once the simulation has cooled down and stopped.
    pub fn is_settled(&self) -> bool {
        !self.running
    }

    pub fn is_sticky(&self) -> bool {
        self.sticky
    }

    /// Number of ticks run so far.
    pub fn ticks(&self) -> usize {
        self.ticks
    }

    /// Advances the simulation by one tick, running or not.
    pub fn tick(&mut self) {
        self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;
        let ctx = TickContext {
            alpha: self.alpha,
            canvas: self.canvas,
        };

        let (nodes, links) = self.set.parts_mut();
        for force in &mut self.forces {
            force.apply(nodes, links, &ctx);
        }

        let retain = 1.0 - self.velocity_decay;
        for node in nodes.iter_mut() {
            match node.fx {
                Some(fx) => {
                    node.x = fx;
                    node.vx = 0.0;
                }
                None => {
                    node.vx *= retain;
                    node.x += node.vx;
                }
            }
            match node.fy {
                Some(fy) => {
                    node.y = fy;
                    node.vy = 0.0;
                }
                None => {
                    node.vy *= retain;
                    node.y += node.vy;
                }
            }
        }
        self.ticks += 1;
    }

    /// Runs one tick if the simulation is running; returns whether it did.
    ///
    /// Stops the simulation once alpha falls below the minimum.
    pub fn step(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.tick();
        if self.alpha < self.alpha_min {
            self.running = false;
            if self.sticky {
                self.pin_all();
            }
            debug!(ticks = self.ticks, sticky = self.sticky; "Simulation settled");
        }
        true
    }

    /// Steps until settled or until `max_ticks` ticks ran; returns the count.
    pub fn run(&mut self, max_ticks: usize) -> usize {
        let mut ran = 0;
        while ran < max_ticks && self.step() {
            ran += 1;
        }
        ran
    }

    /// Sets alpha to `intensity` and resumes ticking.
    pub fn restart(&mut self, intensity: f32) {
        trace!(intensity = intensity; "Simulation restarted");
        self.alpha = intensity;
        self.running = true;
    }

    /// Resumes ticking at the current alpha.
    pub fn resume(&mut self) {
        self.running = true;
    }

    /// Stops ticking; positions are kept.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// The energy alpha converges to; non-zero while a node is dragged.
    pub fn set_alpha_target(&mut self, target: f32) {
        self.alpha_target = target;
    }

    /// Switches sticky mode. Turning it off releases every pin.
    pub fn set_sticky(&mut self, sticky: bool) {
        self.sticky = sticky;
        if sticky {
            if !self.running {
                self.pin_all();
            }
        } else {
            self.unpin_all();
        }
    }

    /// Pins node `id` at `position`; returns `false` for unknown nodes.
    pub fn pin(&mut self, id: XmiId, position: Point) -> bool {
        let Some(node) = self.set.node_mut(id) else {
            return false;
        };
        node.fx = Some(position.x());
        node.fy = Some(position.y());
        node.x = position.x();
        node.y = position.y();
        true
    }

    /// Releases node `id`; returns `false` for unknown nodes.
    pub fn unpin(&mut self, id: XmiId) -> bool {
        let Some(node) = self.set.node_mut(id) else {
            return false;
        };
        node.fx = None;
        node.fy = None;
        true
    }

    fn pin_all(&mut self) {
        let (nodes, _) = self.set.parts_mut();
        for node in nodes {
            node.fx = Some(node.x);
            node.fy = Some(node.y);
        }
    }

    fn unpin_all(&mut self) {
        let (nodes, _) = self.set.parts_mut();
        for node in nodes {
            node.fx = None;
            node.fy = None;
        }
    }

    /// Replaces the working set after a filter change.
    ///
    /// Nodes that survive keep position, velocity and pin. New nodes start
    /// next to their parent when it is placed, on the spiral otherwise. The
    /// simulation restarts at the reduced filter energy instead of a cold
    /// start, unless it is hotter already.
    pub fn set_working_set(&mut self, mut set: WorkingSet) {
        let mut kept = 0;
        {
            let (nodes, _) = set.parts_mut();
            for node in nodes {
                if let Some(old) = self.set.node(node.id()) {
                    node.x = old.x;
                    node.y = old.y;
                    node.vx = old.vx;
                    node.vy = old.vy;
                    node.fx = old.fx;
                    node.fy = old.fy;
                    kept += 1;
                }
            }
        }
        debug!(nodes = set.len(), kept = kept; "Working set replaced");

        self.set = set;
        self.place_new_nodes();
        self.initialize_forces();
        self.restart(self.alpha.max(self.filter_reheat));
    }

    /// Changes the canvas and reheats so nodes move into the new bounds.
    pub fn resize(&mut self, canvas: Size) {
        debug!(width = canvas.width(), height = canvas.height(); "Canvas resized");
        self.canvas = canvas;
        if !self.set.is_empty() {
            self.restart(self.alpha.max(self.filter_reheat));
        }
    }

    /// Sum of the pairwise intersection areas of all class boxes.
    pub fn total_overlap_area(&self) -> f32 {
        let classes: Vec<_> = self
            .set
            .nodes()
            .iter()
            .filter(|node| node.kind() == NodeKind::Class)
            .map(LayoutNode::bounds)
            .collect();
        let mut total = 0.0;
        for (i, a) in classes.iter().enumerate() {
            for b in &classes[i + 1..] {
                total += a.intersection_area(b);
            }
        }
        total
    }

    fn initialize_forces(&mut self) {
        let (nodes, links) = self.set.parts_mut();
        for force in &mut self.forces {
            force.initialize(nodes, links);
            trace!(force = force.name(); "Force initialized");
        }
    }

    /// Places every node that has no position yet.
    ///
    /// Nodes whose parent is placed start next to it, the rest on a
    /// phyllotaxis spiral around the canvas center. Exactly coincident
    /// positions are jittered apart.
    fn place_new_nodes(&mut self) {
        let mut rng = rand::rng();
        let center = Point::new(self.canvas.width() / 2.0, self.canvas.height() / 2.0);
        let angle_step = PI * (3.0 - 5.0_f32.sqrt());

        let parents: Vec<Option<Point>> = self
            .set
            .nodes()
            .iter()
            .map(|node| {
                node.parent()
                    .and_then(|p| self.set.node(p))
                    .filter(|p| p.is_placed())
                    .map(LayoutNode::position)
            })
            .collect();

        let mut seen = HashSet::new();
        let mut spiral = 0;
        let (nodes, _) = self.set.parts_mut();
        for (node, parent) in nodes.iter_mut().zip(parents) {
            if !node.is_placed() {
                let position = match parent {
                    Some(parent) => parent.add_point(Point::new(
                        rng.random_range(-INITIAL_RADIUS..INITIAL_RADIUS),
                        rng.random_range(-INITIAL_RADIUS..INITIAL_RADIUS),
                    )),
                    None => {
                        let radius = INITIAL_RADIUS * (0.5 + spiral as f32).sqrt();
                        let angle = spiral as f32 * angle_step;
                        spiral += 1;
                        center.add_point(Point::new(radius * angle.cos(), radius * angle.sin()))
                    }
                };
                node.x = position.x();
                node.y = position.y();
                node.vx = 0.0;
                node.vy = 0.0;
            }
            if !seen.insert((node.x.to_bits(), node.y.to_bits())) {
                node.x += rng.random_range(-1.0..1.0);
                node.y += rng.random_range(-1.0..1.0);
            }
        }
    }
}
