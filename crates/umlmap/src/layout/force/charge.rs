use super::{Force, TickContext, jiggle};
use crate::layout::working_set::{LayoutLink, LayoutNode};

/// Uniform many-body force; negative strength repels.
///
/// Each node accelerates by `strength * alpha / d` along the direction to
/// every other node, with distances below `distance_min` softened to avoid
/// blow-ups between nearly coincident nodes.
#[derive(Debug, Clone)]
pub struct ChargeForce {
    strength: f32,
    distance_min: f32,
}

impl ChargeForce {
    pub fn new(strength: f32, distance_min: f32) -> Self {
        Self {
            strength,
            distance_min,
        }
    }
}

impl Force for ChargeForce {
    fn name(&self) -> &'static str {
        "charge"
    }

    fn apply(&mut self, nodes: &mut [LayoutNode], _links: &[LayoutLink], ctx: &TickContext) {
        let distance_min2 = self.distance_min * self.distance_min;
        for i in 0..nodes.len() {
            let (mut vx, mut vy) = (0.0, 0.0);
            for j in 0..nodes.len() {
                if i == j {
                    continue;
                }
                let mut x = nodes[j].x - nodes[i].x;
                let mut y = nodes[j].y - nodes[i].y;
                if x == 0.0 && y == 0.0 {
                    x = jiggle();
                    y = jiggle();
                }
                let mut l = x * x + y * y;
                if l < distance_min2 {
                    l = (distance_min2 * l).sqrt();
                }
                let w = self.strength * ctx.alpha / l;
                vx += x * w;
                vy += y * w;
            }
            nodes[i].vx += vx;
            nodes[i].vy += vy;
        }
    }
}
