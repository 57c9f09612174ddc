use super::{Force, TickContext};
use crate::layout::working_set::{LayoutLink, LayoutNode};

/// Keeps free nodes inside the canvas minus a margin.
///
/// Positions are clamped, then velocities are clamped so that the next
/// integration step cannot leave the allowed range either. A box larger than
/// the available space is centered on that axis.
#[derive(Debug, Clone)]
pub struct BoundsForce {
    margin: f32,
}

impl BoundsForce {
    pub fn new(margin: f32) -> Self {
        Self { margin }
    }
}

/// Allowed center range for a box of `extent` on an axis of `length`.
fn range(length: f32, extent: f32, margin: f32) -> (f32, f32) {
    let min = margin + extent / 2.0;
    let max = length - margin - extent / 2.0;
    if min > max {
        (length / 2.0, length / 2.0)
    } else {
        (min, max)
    }
}

impl Force for BoundsForce {
    fn name(&self) -> &'static str {
        "bounds"
    }

    fn apply(&mut self, nodes: &mut [LayoutNode], _links: &[LayoutLink], ctx: &TickContext) {
        for node in nodes.iter_mut().filter(|node| !node.is_pinned()) {
            let (min_x, max_x) = range(ctx.canvas.width(), node.size().width(), self.margin);
            let (min_y, max_y) = range(ctx.canvas.height(), node.size().height(), self.margin);

            node.x = node.x.clamp(min_x, max_x);
            node.y = node.y.clamp(min_y, max_y);
            node.vx = node.vx.clamp(min_x - node.x, max_x - node.x);
            node.vy = node.vy.clamp(min_y - node.y, max_y - node.y);
        }
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;

    use umlmap_core::{
        geometry::{Point, Size},
        identifier::XmiId,
    };

    use super::*;
    use crate::layout::working_set::NodeKind;

    fn ctx() -> TickContext {
        TickContext {
            alpha: 1.0,
            canvas: Size::new(100.0, 100.0),
        }
    }

    #[test]
    fn test_clamps_position_and_velocity() {
        let mut nodes = vec![
            LayoutNode::new(XmiId::new("A"), NodeKind::Class, Size::new(20.0, 10.0))
                .at(Point::new(-50.0, 50.0)),
        ];
        nodes[0].vy = 100.0;

        BoundsForce::new(10.0).apply(&mut nodes, &[], &ctx());

        assert!(approx_eq!(f32, nodes[0].x, 20.0));
        assert!(approx_eq!(f32, nodes[0].vy, 35.0));
    }

    #[test]
    fn test_oversized_box_is_centered() {
        let mut nodes = vec![
            LayoutNode::new(XmiId::new("A"), NodeKind::Class, Size::new(500.0, 10.0))
                .at(Point::new(3.0, 50.0)),
        ];

        BoundsForce::new(10.0).apply(&mut nodes, &[], &ctx());

        assert!(approx_eq!(f32, nodes[0].x, 50.0));
    }

    #[test]
    fn test_pinned_nodes_are_left_alone() {
        let mut nodes = vec![
            LayoutNode::new(XmiId::new("A"), NodeKind::Class, Size::new(20.0, 10.0))
                .at(Point::new(-50.0, 50.0)),
        ];
        nodes[0].fx = Some(-50.0);

        BoundsForce::new(10.0).apply(&mut nodes, &[], &ctx());

        assert!(approx_eq!(f32, nodes[0].x, -50.0));
    }
}
