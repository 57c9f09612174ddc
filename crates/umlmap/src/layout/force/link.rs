use super::{Force, TickContext, jiggle};
use crate::layout::working_set::{LayoutLink, LayoutNode};

/// Spring force along links, pulling each pair towards the link's distance.
///
/// One instance handles either the model relations (generalizations and
/// associations) or the synthetic containment edges. Without a fixed
/// strength, a link's strength is `1 / min(degree(source), degree(target))`
/// so that hubs are not torn apart, and the correction is split between the
/// two ends in proportion to their degrees.
#[derive(Debug, Clone)]
pub struct LinkForce {
    containment: bool,
    strength: Option<f32>,
    strengths: Vec<f32>,
    biases: Vec<f32>,
}

impl LinkForce {
    /// Force over generalization and association links.
    pub fn relations(strength: Option<f32>) -> Self {
        Self {
            containment: false,
            strength,
            strengths: Vec::new(),
            biases: Vec::new(),
        }
    }

    /// Force over the containment links that group nodes around their package.
    pub fn containment(strength: f32) -> Self {
        Self {
            containment: true,
            strength: Some(strength),
            strengths: Vec::new(),
            biases: Vec::new(),
        }
    }

    fn selects(&self, link: &LayoutLink) -> bool {
        link.kind().is_relation() != self.containment
    }
}

impl Force for LinkForce {
    fn name(&self) -> &'static str {
        if self.containment { "group" } else { "link" }
    }

    fn initialize(&mut self, nodes: &[LayoutNode], links: &[LayoutLink]) {
        let mut degree = vec![0_usize; nodes.len()];
        for link in links.iter().filter(|link| self.selects(link)) {
            degree[link.source()] += 1;
            degree[link.target()] += 1;
        }

        self.strengths = links
            .iter()
            .map(|link| {
                self.strength.unwrap_or_else(|| {
                    1.0 / degree[link.source()].min(degree[link.target()]).max(1) as f32
                })
            })
            .collect();
        self.biases = links
            .iter()
            .map(|link| {
                let (s, t) = (degree[link.source()], degree[link.target()]);
                if s + t == 0 {
                    0.5
                } else {
                    s as f32 / (s + t) as f32
                }
            })
            .collect();
    }

    fn apply(&mut self, nodes: &mut [LayoutNode], links: &[LayoutLink], ctx: &TickContext) {
        if self.strengths.len() != links.len() {
            self.initialize(nodes, links);
        }
        for (i, link) in links.iter().enumerate() {
            if !self.selects(link) || link.source() == link.target() {
                continue;
            }
            let (s, t) = (link.source(), link.target());

            let mut x = nodes[t].x + nodes[t].vx - nodes[s].x - nodes[s].vx;
            let mut y = nodes[t].y + nodes[t].vy - nodes[s].y - nodes[s].vy;
            if x == 0.0 {
                x = jiggle();
            }
            if y == 0.0 {
                y = jiggle();
            }
            let length = x.hypot(y);
            let k = (length - link.distance()) / length * ctx.alpha * self.strengths[i];
            x *= k;
            y *= k;

            let bias = self.biases[i];
            nodes[t].vx -= x * bias;
            nodes[t].vy -= y * bias;
            nodes[s].vx += x * (1.0 - bias);
            nodes[s].vy += y * (1.0 - bias);
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
    use crate::layout::working_set::{LinkKind, NodeKind};

    fn node(id: &str, x: f32, y: f32) -> LayoutNode {
        LayoutNode::new(XmiId::new(id), NodeKind::Class, Size::new(10.0, 10.0)).at(Point::new(x, y))
    }

    fn ctx(alpha: f32) -> TickContext {
        TickContext {
            alpha,
            canvas: Size::new(100.0, 100.0),
        }
    }

    #[test]
    fn test_stretched_link_pulls_ends_together() {
        let mut nodes = vec![node("A", 0.0, 0.0), node("B", 100.0, 0.0)];
        let links = vec![LayoutLink::new(0, 1, LinkKind::Association, 40.0)];
        let mut force = LinkForce::relations(None);
        force.initialize(&nodes, &links);

        force.apply(&mut nodes, &links, &ctx(1.0));

        // Degree 1 on both ends: strength 1, bias 0.5, correction 60.
        assert!(approx_eq!(f32, nodes[0].vx, 30.0, epsilon = 1e-4));
        assert!(approx_eq!(f32, nodes[1].vx, -30.0, epsilon = 1e-4));
    }

    #[test]
    fn test_coincident_ends_are_pushed_apart() {
        let mut nodes = vec![node("A", 5.0, 5.0), node("B", 5.0, 5.0)];
        let links = vec![LayoutLink::new(0, 1, LinkKind::Association, 40.0)];
        let mut force = LinkForce::relations(None);
        force.initialize(&nodes, &links);

        for _ in 0..100 {
            force.apply(&mut nodes, &links, &ctx(1.0));
            assert!(nodes.iter().all(|n| n.vx.is_finite() && n.vy.is_finite()));
            for node in &mut nodes {
                node.vx = 0.0;
                node.vy = 0.0;
            }
        }
    }

    #[test]
    fn test_hub_strength_and_bias() {
        let mut nodes = vec![
            node("HUB", 0.0, 0.0),
            node("A", 100.0, 0.0),
            node("B", -100.0, 0.0),
        ];
        let links = vec![
            LayoutLink::new(0, 1, LinkKind::Generalization, 0.0),
            LayoutLink::new(0, 2, LinkKind::Generalization, 0.0),
        ];
        let mut force = LinkForce::relations(None);
        force.initialize(&nodes, &links);

        force.apply(&mut nodes, &links, &ctx(0.5));

        // Hub degree 2, leaves degree 1: strength 1, two thirds of each
        // correction go to the leaf. The second link already sees the hub's
        // velocity from the first: x = -100 - 50 / 3.
        assert!(approx_eq!(f32, nodes[1].vx, -100.0 / 3.0, epsilon = 1e-3));
        assert!(approx_eq!(f32, nodes[2].vx, 350.0 / 9.0, epsilon = 1e-3));
        assert!(approx_eq!(f32, nodes[0].vx, 50.0 / 3.0 - 175.0 / 9.0, epsilon = 1e-3));
    }

    #[test]
    fn test_kinds_are_split_between_instances() {
        let mut nodes = vec![node("C", 0.0, 0.0), node("P", 50.0, 0.0)];
        let links = vec![LayoutLink::new(0, 1, LinkKind::Containment, 0.0)];

        let mut relations = LinkForce::relations(None);
        relations.initialize(&nodes, &links);
        relations.apply(&mut nodes, &links, &ctx(1.0));
        assert!(approx_eq!(f32, nodes[0].vx, 0.0));

        let mut group = LinkForce::containment(0.2);
        group.initialize(&nodes, &links);
        group.apply(&mut nodes, &links, &ctx(1.0));
        assert!(approx_eq!(f32, nodes[0].vx, 5.0, epsilon = 1e-4));
        assert!(approx_eq!(f32, nodes[1].vx, -5.0, epsilon = 1e-4));
    }
}
