//! Forces acting on layout nodes.
//!
//! A [`Force`] reads node positions and adjusts velocities (or, for the
//! centering and bounding forces, positions) once per tick. The simulation
//! applies its forces in a fixed order; [`default_forces`] builds the standard
//! chain.

mod bounds;
mod center;
mod charge;
mod collide;
mod link;

use rand::Rng;

use umlmap_core::geometry::Size;

pub use bounds::BoundsForce;
pub use center::CenterForce;
pub use charge::ChargeForce;
pub use collide::CollideForce;
pub use link::LinkForce;

use super::working_set::{LayoutLink, LayoutNode};
use crate::config::LayoutConfig;

/// Per-tick inputs shared by all forces.
#[derive(Debug, Clone, Copy)]
pub struct TickContext {
    /// Current simulation energy; most forces scale their effect by it.
    pub alpha: f32,
    pub canvas: Size,
}

/// One component of the simulation.
pub trait Force {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Called whenever the node or link set changes.
    fn initialize(&mut self, _nodes: &[LayoutNode], _links: &[LayoutLink]) {}

    /// Applies the force for one tick.
    fn apply(&mut self, nodes: &mut [LayoutNode], links: &[LayoutLink], ctx: &TickContext);
}

/// The standard force chain, in application order:
/// link, group, collide, charge, center, bounds.
pub fn default_forces(config: &LayoutConfig) -> Vec<Box<dyn Force>> {
    vec![
        Box::new(LinkForce::relations(config.link_strength())),
        Box::new(LinkForce::containment(config.group_strength())),
        Box::new(CollideForce::new(
            config.collide_margin(),
            config.collide_strength(),
            config.collide_iterations(),
        )),
        Box::new(ChargeForce::new(
            config.charge_strength(),
            config.distance_min(),
        )),
        Box::new(CenterForce::new(config.center_strength())),
        Box::new(BoundsForce::new(config.margin())),
    ]
}

/// A tiny random offset used to separate exactly coincident nodes.
///
/// Never zero, so a jiggled axis always yields a non-zero distance.
pub(crate) fn jiggle() -> f32 {
    let mut rng = rand::rng();
    let magnitude = rng.random_range(0.5e-6..1e-6_f32);
    if rng.random_bool(0.5) {
        magnitude
    } else {
        -magnitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jiggle_is_tiny_and_never_zero() {
        for _ in 0..10_000 {
            let offset = jiggle();
            assert!(offset != 0.0);
            assert!(offset.abs() < 1e-6);
        }
    }
}
