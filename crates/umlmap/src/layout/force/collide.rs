use super::{Force, TickContext};
use crate::layout::working_set::{LayoutLink, LayoutNode};

/// Rectangle collision.
///
/// Every pair of class boxes whose predicted positions come closer than
/// `margin` to each other is pushed apart along the axis of least overlap.
/// The push is not scaled by alpha. It is shared between the two nodes, and
/// pinned nodes take no share. Several relaxation passes run per tick.
#[derive(Debug, Clone)]
pub struct CollideForce {
    margin: f32,
    strength: f32,
    iterations: usize,
}

impl CollideForce {
    pub fn new(margin: f32, strength: f32, iterations: usize) -> Self {
        Self {
            margin,
            strength,
            iterations: iterations.max(1),
        }
    }
}

impl Force for CollideForce {
    fn name(&self) -> &'static str {
        "collide"
    }

    fn apply(&mut self, nodes: &mut [LayoutNode], _links: &[LayoutLink], _ctx: &TickContext) {
        for _ in 0..self.iterations {
            for i in 0..nodes.len() {
                if nodes[i].is_anchor() {
                    continue;
                }
                for j in (i + 1)..nodes.len() {
                    if nodes[j].is_anchor() {
                        continue;
                    }
                    self.separate(nodes, i, j);
                }
            }
        }
    }
}

impl CollideForce {
    fn separate(&self, nodes: &mut [LayoutNode], i: usize, j: usize) {
        let (a, b) = (&nodes[i], &nodes[j]);
        let share_a = if a.is_pinned() { 0.0 } else { 1.0 };
        let share_b = if b.is_pinned() { 0.0 } else { 1.0 };
        if share_a + share_b == 0.0 {
            return;
        }

        let dx = (b.x + b.vx) - (a.x + a.vx);
        let dy = (b.y + b.vy) - (a.y + a.vy);
        let overlap_x = (a.size().width() + b.size().width()) / 2.0 + self.margin - dx.abs();
        let overlap_y = (a.size().height() + b.size().height()) / 2.0 + self.margin - dy.abs();
        if overlap_x <= 0.0 || overlap_y <= 0.0 {
            return;
        }

        let total = share_a + share_b;
        let (share_a, share_b) = (share_a / total, share_b / total);
        if overlap_x < overlap_y {
            let push = overlap_x * self.strength * if dx < 0.0 { -1.0 } else { 1.0 };
            nodes[i].vx -= push * share_a;
            nodes[j].vx += push * share_b;
        } else {
            let push = overlap_y * self.strength * if dy < 0.0 { -1.0 } else { 1.0 };
            nodes[i].vy -= push * share_a;
            nodes[j].vy += push * share_b;
        }
    }
}
