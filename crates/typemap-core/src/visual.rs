//! Visual graph model and the sink contract used to hand it off.

use crate::key::TypeKey;
use serde::Serialize;
use std::collections::HashMap;

/// Role tag carried by every visual node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    Root,
    Branch,
    Leaf,
}

impl NodeRole {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeRole::Root => "root",
            NodeRole::Branch => "branch",
            NodeRole::Leaf => "leaf",
        }
    }
}

/// A node of the rendered hierarchy, unique per key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisualNode {
    pub key: TypeKey,
    pub color: String,
    /// Weight hint for physics-based layouts.
    pub mass: u32,
    pub module: String,
    pub role: NodeRole,
    /// Whether the layout engine may move the node.
    pub physics: bool,
}

/// Directed parent → child edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VisualEdge {
    pub parent: TypeKey,
    pub child: TypeKey,
}

/// Receiver of node and edge insertions.
pub trait VisualizationSink {
    fn add_node(&mut self, node: VisualNode);

    fn add_edge(&mut self, edge: VisualEdge);

    /// Recolor a node that was already added. Leaf nodes are recolored this way.
    fn set_node_color(&mut self, key: &TypeKey, color: &str, role: NodeRole);
}

/// Materialized nodes (in creation order) and edges.
#[derive(Debug, Clone, Default)]
pub struct VisualGraph {
    nodes: Vec<VisualNode>,
    edges: Vec<VisualEdge>,
    index: HashMap<TypeKey, usize>,
}

impl VisualGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[VisualNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[VisualEdge] {
        &self.edges
    }

    pub fn node(&self, key: &TypeKey) -> Option<&VisualNode> {
        self.index.get(key).map(|&i| &self.nodes[i])
    }

    pub fn contains(&self, key: &TypeKey) -> bool {
        self.index.contains_key(key)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Edges pointing at `key`.
    pub fn incoming<'a>(&'a self, key: &'a TypeKey) -> impl Iterator<Item = &'a VisualEdge> {
        self.edges.iter().filter(move |e| &e.child == key)
    }

    /// Hand the finished graph to another sink: every node, then every edge.
    pub fn replay(&self, sink: &mut impl VisualizationSink) {
        for node in &self.nodes {
            sink.add_node(node.clone());
        }
        for edge in &self.edges {
            sink.add_edge(edge.clone());
        }
    }
}

impl VisualizationSink for VisualGraph {
    /// Adding a key twice replaces the earlier node in place.
    fn add_node(&mut self, node: VisualNode) {
        if let Some(&i) = self.index.get(&node.key) {
            self.nodes[i] = node;
            return;
        }
        self.index.insert(node.key.clone(), self.nodes.len());
        self.nodes.push(node);
    }

    fn add_edge(&mut self, edge: VisualEdge) {
        self.edges.push(edge);
    }

    fn set_node_color(&mut self, key: &TypeKey, color: &str, role: NodeRole) {
        if let Some(&i) = self.index.get(key) {
            let node = &mut self.nodes[i];
            node.color = color.to_string();
            node.role = role;
        }
    }
}
