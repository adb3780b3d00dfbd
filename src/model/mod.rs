//! Graph model handed to the renderer
//!
//! Nodes are upserted by accession: a node touched by several annotation
//! passes ends up once in the model with the merged attributes.

use crate::graph::{Accession, Color};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Border colour of every node
pub const NODE_BORDER: &str = "#000000";
/// Colour of every edge
pub const EDGE_COLOR: &str = "lightgray";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeColor {
    pub border: Color,
    pub background: Color,
}

impl NodeColor {
    /// Black border around `background`
    pub fn filled(background: Color) -> Self {
        Self {
            border: Color::from(NODE_BORDER),
            background,
        }
    }
}

/// Partial node attributes from one annotation pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeAttributes {
    pub size: Option<u64>,
    pub color: Option<NodeColor>,
    pub title: Option<String>,
}

impl NodeAttributes {
    /// Overlay `other` on `self`; fields set in `other` win
    pub fn merge(&mut self, other: NodeAttributes) {
        if other.size.is_some() {
            self.size = other.size;
        }
        if other.color.is_some() {
            self.color = other.color;
        }
        if other.title.is_some() {
            self.title = other.title;
        }
    }
}

/// A node as the renderer receives it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisNode {
    pub id: Accession,
    pub label: String,
    pub shape: String,
    pub size: u64,
    pub color: NodeColor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// An edge as the renderer receives it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisEdge {
    pub from: Accession,
    pub to: Accession,
    /// Raw genomic distance
    pub weight: f64,
    /// Line thickness
    pub value: f64,
    pub color: Color,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Final node and edge lists
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphModel {
    pub nodes: Vec<VisNode>,
    pub edges: Vec<VisEdge>,
}

impl GraphModel {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

/// Collects node attributes and edges, then builds a `GraphModel`
#[derive(Debug, Default)]
pub struct GraphModelBuilder {
    nodes: IndexMap<Accession, NodeAttributes>,
    edges: Vec<VisEdge>,
}

impl GraphModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node or merge into the existing entry
    pub fn upsert_node(&mut self, id: Accession, attributes: NodeAttributes) -> &mut Self {
        self.nodes.entry(id).or_default().merge(attributes);
        self
    }

    pub fn add_edge(&mut self, edge: VisEdge) -> &mut Self {
        self.edges.push(edge);
        self
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Build the model. Nodes keep first-insertion order; edges referring
    /// to nodes that never made it into the model are dropped.
    pub fn build(self) -> GraphModel {
        let nodes: Vec<VisNode> = self
            .nodes
            .into_iter()
            .map(|(id, attrs)| VisNode {
                label: id.as_str().to_string(),
                shape: "dot".to_string(),
                size: attrs.size.unwrap_or_default(),
                color: attrs
                    .color
                    .unwrap_or_else(|| NodeColor::filled(Color::from("#97c2fc"))),
                title: attrs.title,
                id,
            })
            .collect();

        let known: std::collections::HashSet<&Accession> = nodes.iter().map(|n| &n.id).collect();
        let mut edges = Vec::with_capacity(self.edges.len());
        for edge in self.edges {
            if known.contains(&edge.from) && known.contains(&edge.to) {
                edges.push(edge);
            } else {
                warn!("Dropping edge {} -> {}: endpoint has no node", edge.from, edge.to);
            }
        }

        GraphModel { nodes, edges }
    }
}
