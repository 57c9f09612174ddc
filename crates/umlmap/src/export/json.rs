//! JSON output of node positions, for consumers that draw the diagram
//! themselves.

use log::debug;
use serde::Serialize;

use super::{Diagram, Exporter};
use crate::{
    error::UmlmapError,
    layout::{LinkKind, NodeKind},
};

#[derive(Debug, Serialize)]
struct JsonDiagram<'a> {
    width: f32,
    height: f32,
    nodes: Vec<JsonNode<'a>>,
    links: Vec<JsonLink>,
}

#[derive(Debug, Serialize)]
struct JsonNode<'a> {
    id: String,
    name: &'a str,
    kind: NodeKind,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    stereotype: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct JsonLink {
    source: String,
    target: String,
    kind: LinkKind,
}

/// Writes positions and relation links as JSON; containment links are left out.
#[derive(Debug, Clone, Default)]
pub struct JsonExporter {
    pretty: bool,
}

impl JsonExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Exporter for JsonExporter {
    fn render(&self, diagram: &Diagram<'_>) -> Result<String, UmlmapError> {
        let model = diagram.model();
        let set = diagram.working_set();

        let nodes = set
            .nodes()
            .iter()
            .map(|node| {
                let position = node.position();
                JsonNode {
                    id: node.id().to_string(),
                    name: model.node(node.id()).map(|n| n.name()).unwrap_or_default(),
                    kind: node.kind(),
                    x: position.x(),
                    y: position.y(),
                    width: node.size().width(),
                    height: node.size().height(),
                    stereotype: node
                        .stereotype()
                        .and_then(|s| model.package(s))
                        .map(|s| s.name()),
                }
            })
            .collect();
        let links = set
            .links()
            .iter()
            .filter(|link| link.kind().is_relation())
            .map(|link| JsonLink {
                source: set.nodes()[link.source()].id().to_string(),
                target: set.nodes()[link.target()].id().to_string(),
                kind: link.kind(),
            })
            .collect();

        let document = JsonDiagram {
            width: diagram.canvas().width(),
            height: diagram.canvas().height(),
            nodes,
            links,
        };
        debug!(nodes = document.nodes.len(), links = document.links.len(); "Rendering JSON");

        let output = if self.pretty {
            serde_json::to_string_pretty(&document)?
        } else {
            serde_json::to_string(&document)?
        };
        Ok(output)
    }
}
