//! The set of nodes and edges a simulation runs on.
//!
//! A [`WorkingSet`] is rebuilt whenever the search or the hidden stereotypes
//! change. It contains the visible diagram nodes in diagram order, the
//! generalizations and associations between them, and one synthetic
//! containment edge from every node to its parent package.

use std::collections::{HashMap, HashSet};

use log::debug;
use serde::Serialize;

use umlmap_core::{
    geometry::{Bounds, Point, Size},
    identifier::XmiId,
    semantic::{Attribute, Classification, LinkRef, Model, ModelError, NodeRef},
};

use crate::{
    config::{LayoutConfig, StyleConfig},
    filter::SearchContext,
};

/// What a layout node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Stereotype,
    Package,
    Class,
}

impl From<NodeRef<'_>> for NodeKind {
    fn from(node: NodeRef<'_>) -> Self {
        match node {
            NodeRef::Stereotype(_) => Self::Stereotype,
            NodeRef::Package(_) => Self::Package,
            NodeRef::Classification(_) => Self::Class,
        }
    }
}

/// Edge categories; containment edges are never drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    Generalization,
    Association,
    Containment,
}

impl LinkKind {
    /// Returns `true` for the edges that come from the model.
    pub fn is_relation(self) -> bool {
        !matches!(self, Self::Containment)
    }
}

/// A positioned node.
///
/// Packages and stereotypes are zero-sized anchors that their contents are
/// grouped around; only classes occupy space.
#[derive(Debug, Clone)]
pub struct LayoutNode {
    id: XmiId,
    parent: Option<XmiId>,
    stereotype: Option<XmiId>,
    kind: NodeKind,
    size: Size,
    pub(crate) x: f32,
    pub(crate) y: f32,
    pub(crate) vx: f32,
    pub(crate) vy: f32,
    pub(crate) fx: Option<f32>,
    pub(crate) fy: Option<f32>,
}

impl LayoutNode {
    /// Creates an unplaced node.
    pub fn new(id: XmiId, kind: NodeKind, size: Size) -> Self {
        Self {
            id,
            parent: None,
            stereotype: None,
            kind,
            size,
            x: f32::NAN,
            y: f32::NAN,
            vx: 0.0,
            vy: 0.0,
            fx: None,
            fy: None,
        }
    }

    pub fn with_parent(mut self, parent: Option<XmiId>) -> Self {
        self.parent = parent;
        self
    }

    pub fn with_stereotype(mut self, stereotype: Option<XmiId>) -> Self {
        self.stereotype = stereotype;
        self
    }

    /// Places the node at `position` with no velocity.
    pub fn at(mut self, position: Point) -> Self {
        self.x = position.x();
        self.y = position.y();
        self
    }

    pub fn id(&self) -> XmiId {
        self.id
    }

    pub fn parent(&self) -> Option<XmiId> {
        self.parent
    }

    pub fn stereotype(&self) -> Option<XmiId> {
        self.stereotype
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// Returns `true` for the zero-sized package and stereotype anchors.
    pub fn is_anchor(&self) -> bool {
        self.size.is_zero()
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn velocity(&self) -> Point {
        Point::new(self.vx, self.vy)
    }

    /// The node's box, centered on its position.
    pub fn bounds(&self) -> Bounds {
        Bounds::new_from_center(self.position(), self.size)
    }

    pub fn is_pinned(&self) -> bool {
        self.fx.is_some() || self.fy.is_some()
    }

    pub(crate) fn is_placed(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// An edge between two nodes of a [`WorkingSet`], by index.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutLink {
    source: usize,
    target: usize,
    kind: LinkKind,
    distance: f32,
    xmi_id: Option<XmiId>,
}

impl LayoutLink {
    pub fn new(source: usize, target: usize, kind: LinkKind, distance: f32) -> Self {
        Self {
            source,
            target,
            kind,
            distance,
            xmi_id: None,
        }
    }

    /// Attaches the model entity the link was built from.
    pub fn with_xmi_id(mut self, xmi_id: XmiId) -> Self {
        self.xmi_id = Some(xmi_id);
        self
    }

    /// The generalization or association behind a relation link.
    pub fn xmi_id(&self) -> Option<XmiId> {
        self.xmi_id
    }

    pub fn source(&self) -> usize {
        self.source
    }

    pub fn target(&self) -> usize {
        self.target
    }

    pub fn kind(&self) -> LinkKind {
        self.kind
    }

    /// Rest length the link force pulls towards.
    pub fn distance(&self) -> f32 {
        self.distance
    }
}

/// Visible nodes and the links between them.
#[derive(Debug, Clone, Default)]
pub struct WorkingSet {
    nodes: Vec<LayoutNode>,
    links: Vec<LayoutLink>,
    index: HashMap<XmiId, usize>,
}

impl WorkingSet {
    /// Creates a working set from prepared nodes and links.
    ///
    /// Links whose indices fall outside `nodes` are dropped.
    pub fn new(nodes: Vec<LayoutNode>, links: Vec<LayoutLink>) -> Self {
        let index = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.id, i))
            .collect();
        let links = links
            .into_iter()
            .filter(|link| link.source < nodes.len() && link.target < nodes.len())
            .collect();
        Self {
            nodes,
            links,
            index,
        }
    }

    /// Collects the nodes visible under `ctx`, minus those of `hidden`
    /// stereotypes, and the links between them.
    ///
    /// # Errors
    ///
    /// Propagates [`ModelError`] from visibility evaluation.
    pub fn build(
        model: &Model,
        ctx: &SearchContext,
        hidden: &HashSet<XmiId>,
        sizer: &NodeSizer,
        config: &LayoutConfig,
    ) -> Result<Self, ModelError> {
        let mut nodes = Vec::new();
        for id in ctx.visible_nodes(model, None)? {
            let Some(node) = model.node(id) else {
                continue;
            };
            if node.stereotype().is_some_and(|s| hidden.contains(&s)) {
                continue;
            }
            nodes.push(
                LayoutNode::new(id, node.into(), sizer.size_of(model, node))
                    .with_parent(node.parent())
                    .with_stereotype(node.stereotype()),
            );
        }
        let index: HashMap<XmiId, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.id, i))
            .collect();

        let mut links = Vec::new();
        for link in model.get_link_nodes(None) {
            let Some((source, target)) = link.endpoints() else {
                continue;
            };
            let (Some(&s), Some(&t)) = (index.get(&source), index.get(&target)) else {
                continue;
            };
            let kind = match link {
                LinkRef::Generalization(_) => LinkKind::Generalization,
                LinkRef::Association(_) => LinkKind::Association,
            };
            let distance = if nodes[s].parent.is_some() && nodes[s].parent == nodes[t].parent {
                config.same_parent_distance()
            } else {
                config.link_distance()
            };
            links.push(LayoutLink::new(s, t, kind, distance).with_xmi_id(link.xmi_id()));
        }
        for (i, node) in nodes.iter().enumerate() {
            let Some(&parent) = node.parent.and_then(|p| index.get(&p)) else {
                continue;
            };
            let distance = match node.kind {
                NodeKind::Class => 0.0,
                NodeKind::Package | NodeKind::Stereotype => config.nested_package_distance(),
            };
            links.push(LayoutLink::new(i, parent, LinkKind::Containment, distance));
        }

        debug!(
            nodes = nodes.len(),
            links = links.len(),
            hidden = hidden.len();
            "Working set built"
        );
        Ok(Self {
            nodes,
            links,
            index,
        })
    }

    pub fn nodes(&self) -> &[LayoutNode] {
        &self.nodes
    }

    pub fn links(&self) -> &[LayoutLink] {
        &self.links
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn index_of(&self, id: XmiId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    pub fn node(&self, id: XmiId) -> Option<&LayoutNode> {
        self.index_of(id).map(|i| &self.nodes[i])
    }

    pub(crate) fn node_mut(&mut self, id: XmiId) -> Option<&mut LayoutNode> {
        self.index.get(&id).map(|&i| &mut self.nodes[i])
    }

    pub(crate) fn parts_mut(&mut self) -> (&mut [LayoutNode], &[LayoutLink]) {
        (&mut self.nodes, &self.links)
    }

    /// Bounding box of the class nodes below package `id`, if any.
    pub fn content_bounds(&self, model: &Model, id: XmiId) -> Option<Bounds> {
        self.nodes
            .iter()
            .filter(|node| node.kind == NodeKind::Class && model.is_descendant(node.id, id))
            .map(LayoutNode::bounds)
            .reduce(|acc, bounds| acc.merge(&bounds))
    }
}

/// Estimates node sizes from their text.
#[derive(Debug, Clone)]
pub struct NodeSizer {
    char_width: f32,
    line_height: f32,
    padding: f32,
    max_members: usize,
}

impl NodeSizer {
    pub fn new(style: &StyleConfig) -> Self {
        Self {
            char_width: style.char_width(),
            line_height: style.line_height(),
            padding: style.padding(),
            max_members: style.max_members(),
        }
    }

    /// Size of a node's box; packages and stereotypes are zero-sized.
    pub fn size_of(&self, model: &Model, node: NodeRef<'_>) -> Size {
        let NodeRef::Classification(class) = node else {
            return Size::default();
        };
        let lines = self.member_lines(model, class);
        let widest = lines
            .iter()
            .map(|line| line.chars().count())
            .chain(std::iter::once(class.name().chars().count()))
            .max()
            .unwrap_or_default();
        Size::new(
            widest as f32 * self.char_width + 2.0 * self.padding,
            (lines.len() + 1) as f32 * self.line_height + 2.0 * self.padding,
        )
    }

    /// The member lines shown in a class box, with an ellipsis line when
    /// members were elided.
    pub fn member_lines(&self, model: &Model, class: &Classification) -> Vec<String> {
        let members = model.members(class);
        let mut lines: Vec<String> = members
            .iter()
            .take(self.max_members)
            .map(|member| member_label(member))
            .collect();
        if members.len() > self.max_members {
            lines.push(format!("… {} more", members.len() - self.max_members));
        }
        lines
    }
}

/// `name: Type [lower..upper]`, omitting the parts a member does not declare.
pub fn member_label(member: &Attribute) -> String {
    let mut label = member.name().to_string();
    if let Some(type_name) = member.type_name() {
        label.push_str(": ");
        label.push_str(type_name);
    }
    if let Some(multiplicity) = member.multiplicity() {
        label.push_str(&format!(" [{multiplicity}]"));
    }
    label
}
