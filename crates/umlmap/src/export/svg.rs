//! SVG output.
//!
//! Layers are drawn back to front: background, package hulls (outermost
//! first), relation links, then class boxes.

use log::{debug, trace};
use svg::{
    Document,
    node::{
        Text as SvgText,
        element::{self as svg_element, Definitions, Group, Line, Marker, Path, Rectangle},
    },
};

use umlmap_core::{
    color::{Color, Palette},
    geometry::{Bounds, Insets, Point},
    identifier::XmiId,
    semantic::{Classification, Model},
};

use super::{Diagram, Exporter};
use crate::{
    config::StyleConfig,
    error::UmlmapError,
    layout::{LayoutLink, LayoutNode, LinkKind, NodeKind, NodeSizer},
};

const GENERALIZATION_MARKER: &str = "generalization";
const HULL_ALPHA: f32 = 0.08;
const CLASS_ALPHA: f32 = 0.18;

/// Renders diagrams as standalone SVG documents.
#[derive(Debug, Clone)]
pub struct SvgExporter {
    background: Option<Color>,
    palette: Palette,
    sizer: NodeSizer,
    font_size: f32,
    line_height: f32,
    padding: f32,
}

impl SvgExporter {
    /// Creates an exporter from style settings.
    ///
    /// # Errors
    ///
    /// Returns [`UmlmapError::Config`] when the background or a palette
    /// entry is not a valid CSS color.
    pub fn new(style: &StyleConfig) -> Result<Self, UmlmapError> {
        Ok(Self {
            background: style.background_color().map_err(UmlmapError::Config)?,
            palette: style.palette().map_err(UmlmapError::Config)?,
            sizer: NodeSizer::new(style),
            font_size: style.font_size(),
            line_height: style.line_height(),
            padding: style.padding(),
        })
    }

    fn stereotype_color(&self, model: &Model, stereotype: Option<XmiId>) -> Color {
        stereotype
            .and_then(|s| model.stereotype_index(s))
            .map(|i| self.palette.color_for(i))
            .unwrap_or_default()
    }

    fn render_background(&self, diagram: &Diagram<'_>) -> Option<Rectangle> {
        let color = self.background?;
        Some(
            Rectangle::new()
                .set("x", 0)
                .set("y", 0)
                .set("width", diagram.canvas().width())
                .set("height", diagram.canvas().height())
                .set("fill", color.to_string()),
        )
    }

    fn render_definitions(&self) -> Definitions {
        Definitions::new().add(
            Marker::new()
                .set("id", GENERALIZATION_MARKER)
                .set("viewBox", "0 0 10 10")
                .set("refX", 9)
                .set("refY", 5)
                .set("markerWidth", 10)
                .set("markerHeight", 10)
                .set("orient", "auto")
                .add(
                    Path::new()
                        .set("d", "M 0 0 L 10 5 L 0 10 z")
                        .set("fill", "white")
                        .set("stroke", "black"),
                ),
        )
    }

    /// One translucent rectangle per package or stereotype around the
    /// classes it contains, outer hulls first.
    fn render_hulls(&self, diagram: &Diagram<'_>) -> Group {
        let model = diagram.model();
        let set = diagram.working_set();

        let mut anchors: Vec<(usize, &LayoutNode)> = set
            .nodes()
            .iter()
            .filter(|node| node.kind() != NodeKind::Class)
            .map(|node| (depth(model, node.id()), node))
            .collect();
        anchors.sort_by_key(|(depth, _)| *depth);

        let mut group = Group::new().set("class", "hulls");
        for (depth, node) in anchors {
            let Some(bounds) = set.content_bounds(model, node.id()) else {
                continue;
            };
            // Nested hulls shrink so their borders stay apart.
            let inset = self.padding * 2.0 + self.line_height * 4.0 / (depth + 1) as f32;
            let bounds = bounds.add_padding(Insets::uniform(inset));
            let color = self.stereotype_color(model, node.stereotype());
            let name = model.node(node.id()).map(|n| n.name()).unwrap_or_default();

            group = group.add(
                Rectangle::new()
                    .set("x", bounds.min_x())
                    .set("y", bounds.min_y())
                    .set("width", bounds.width())
                    .set("height", bounds.height())
                    .set("rx", self.padding)
                    .set("fill", color.with_alpha(HULL_ALPHA).to_string())
                    .set("stroke", color.to_string())
                    .set("stroke-dasharray", "4 2"),
            );
            group = group.add(
                self.text(
                    name,
                    Point::new(
                        bounds.min_x() + self.padding,
                        bounds.min_y() + self.line_height,
                    ),
                )
                .set("font-weight", "bold"),
            );
        }
        group
    }

    fn render_links(&self, diagram: &Diagram<'_>) -> Group {
        let mut group = Group::new().set("class", "links");
        let nodes = diagram.working_set().nodes();
        for link in diagram.working_set().links() {
            if !link.kind().is_relation() {
                continue;
            }
            let source = &nodes[link.source()];
            let target = &nodes[link.target()];
            let start = edge_point(source.bounds(), target.position());
            let end = edge_point(target.bounds(), source.position());
            trace!(source:% = source.id(), target:% = target.id(); "Drawing link");

            let mut line = Line::new()
                .set("x1", start.x())
                .set("y1", start.y())
                .set("x2", end.x())
                .set("y2", end.y())
                .set("stroke", "black");
            if link.kind() == LinkKind::Generalization {
                line = line.set("marker-end", format!("url(#{GENERALIZATION_MARKER})"));
            }
            group = group.add(line);

            for (label, at) in self.role_labels(diagram.model(), link, start, end) {
                group = group.add(self.text(&label, at).set("font-style", "italic"));
            }
        }
        group
    }

    /// Role names and multiplicities, placed a third of the way in from
    /// each end.
    fn role_labels(
        &self,
        model: &Model,
        link: &LayoutLink,
        start: Point,
        end: Point,
    ) -> Vec<(String, Point)> {
        if link.kind() != LinkKind::Association {
            return Vec::new();
        }
        let Some(association) = link.xmi_id().and_then(|id| model.association(id)) else {
            return Vec::new();
        };
        let along = end.sub_point(start).scale(1.0 / 3.0);
        [
            (association.source_role(), start.add_point(along)),
            (association.target_role(), end.sub_point(along)),
        ]
        .into_iter()
        .filter_map(|(role, at)| {
            let label = match (role.name(), role.multiplicity()) {
                (Some(name), Some(m)) => format!("{name} [{m}]"),
                (Some(name), None) => name.to_string(),
                (None, Some(m)) => format!("[{m}]"),
                (None, None) => return None,
            };
            Some((label, at))
        })
        .collect()
    }

    fn render_classes(&self, diagram: &Diagram<'_>) -> Group {
        let model = diagram.model();
        let mut group = Group::new().set("class", "classes");
        for node in diagram.working_set().nodes() {
            let Some(class) = model.classification(node.id()) else {
                continue;
            };
            group = group.add(self.render_class(model, class, node));
        }
        group
    }

    fn render_class(&self, model: &Model, class: &Classification, node: &LayoutNode) -> Group {
        let bounds = node.bounds();
        let color = self.stereotype_color(model, node.stereotype());
        let left = bounds.min_x() + self.padding;
        let header = bounds.min_y() + self.padding + self.line_height;

        let mut name = self
            .text(class.name(), Point::new(left, header - 4.0))
            .set("font-weight", "bold");
        if class.is_abstract() {
            name = name.set("font-style", "italic");
        }
        if class.is_deprecated() {
            name = name.set("text-decoration", "line-through");
        }

        let mut group = Group::new()
            .set("id", node.id().to_string())
            .set("class", class.class_type().as_str().to_string())
            .add(
                Rectangle::new()
                    .set("x", bounds.min_x())
                    .set("y", bounds.min_y())
                    .set("width", bounds.width())
                    .set("height", bounds.height())
                    .set("fill", color.with_alpha(CLASS_ALPHA).to_string())
                    .set("stroke", color.to_string()),
            )
            .add(name);

        let lines = self.sizer.member_lines(model, class);
        if !lines.is_empty() {
            group = group.add(
                Line::new()
                    .set("x1", bounds.min_x())
                    .set("y1", header)
                    .set("x2", bounds.max_x())
                    .set("y2", header)
                    .set("stroke", color.to_string()),
            );
        }
        for (i, line) in lines.iter().enumerate() {
            let baseline = header + (i + 1) as f32 * self.line_height - 4.0;
            group = group.add(self.text(line, Point::new(left, baseline)));
        }
        group
    }

    fn text(&self, content: &str, at: Point) -> svg_element::Text {
        svg_element::Text::new("")
            .set("x", at.x())
            .set("y", at.y())
            .set("font-family", "sans-serif")
            .set("font-size", self.font_size)
            .add(svg_element::TSpan::new("").add(SvgText::new(content)))
    }
}

impl Exporter for SvgExporter {
    fn render(&self, diagram: &Diagram<'_>) -> Result<String, UmlmapError> {
        let canvas = diagram.canvas();
        debug!(
            width = canvas.width(),
            height = canvas.height(),
            nodes = diagram.working_set().len();
            "Rendering SVG"
        );

        let mut doc = Document::new()
            .set("viewBox", format!("0 0 {} {}", canvas.width(), canvas.height()))
            .set("width", canvas.width())
            .set("height", canvas.height());
        if let Some(background) = self.render_background(diagram) {
            doc = doc.add(background);
        }
        doc = doc
            .add(self.render_definitions())
            .add(self.render_hulls(diagram))
            .add(self.render_links(diagram))
            .add(self.render_classes(diagram));

        Ok(doc.to_string())
    }
}

/// Number of packages between `id` and the model root.
fn depth(model: &Model, id: XmiId) -> usize {
    let mut depth = 0;
    let mut current = model.node(id).and_then(|node| node.parent());
    while let Some(parent) = current {
        if parent == model.root_id() {
            break;
        }
        depth += 1;
        current = model.node(parent).and_then(|node| node.parent());
    }
    depth
}

/// Where the segment from the center of `bounds` towards `toward` leaves
/// the box.
fn edge_point(bounds: Bounds, toward: Point) -> Point {
    let center = bounds.center();
    let delta = toward.sub_point(center);
    if delta.is_zero() {
        return center;
    }
    let half_width = bounds.width() / 2.0;
    let half_height = bounds.height() / 2.0;
    let tx = if delta.x() == 0.0 {
        f32::INFINITY
    } else {
        half_width / delta.x().abs()
    };
    let ty = if delta.y() == 0.0 {
        f32::INFINITY
    } else {
        half_height / delta.y().abs()
    };
    center.add_point(delta.scale(tx.min(ty).min(1.0)))
}
