use super::{Force, TickContext};
use crate::layout::working_set::{LayoutLink, LayoutNode};

/// Translates all nodes so their centroid moves towards the canvas center.
///
/// Acts on positions directly, so it does not disturb relative layout.
#[derive(Debug, Clone)]
pub struct CenterForce {
    strength: f32,
}

impl CenterForce {
    pub fn new(strength: f32) -> Self {
        Self { strength }
    }
}

impl Force for CenterForce {
    fn name(&self) -> &'static str {
        "center"
    }

    fn apply(&mut self, nodes: &mut [LayoutNode], _links: &[LayoutLink], ctx: &TickContext) {
        if nodes.is_empty() {
            return;
        }
        let n = nodes.len() as f32;
        let (sx, sy) = nodes
            .iter()
            .fold((0.0, 0.0), |(sx, sy), node| (sx + node.x, sy + node.y));
        let shift_x = (sx / n - ctx.canvas.width() / 2.0) * self.strength;
        let shift_y = (sy / n - ctx.canvas.height() / 2.0) * self.strength;
        for node in nodes {
            node.x -= shift_x;
            node.y -= shift_y;
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

    #[test]
    fn test_centroid_moves_to_center() {
        let mut nodes: Vec<LayoutNode> = [(0.0, 0.0), (20.0, 40.0)]
            .into_iter()
            .enumerate()
            .map(|(i, (x, y))| {
                LayoutNode::new(XmiId::from_anonymous(i), NodeKind::Class, Size::new(1.0, 1.0))
                    .at(Point::new(x, y))
            })
            .collect();
        let ctx = TickContext {
            alpha: 1.0,
            canvas: Size::new(200.0, 100.0),
        };

        CenterForce::new(1.0).apply(&mut nodes, &[], &ctx);

        assert!(approx_eq!(f32, nodes[0].x, 90.0));
        assert!(approx_eq!(f32, nodes[0].y, 30.0));
        assert!(approx_eq!(f32, nodes[1].x, 110.0));
        assert!(approx_eq!(f32, nodes[1].y, 70.0));
    }
}
