//! Turn adjacency data into a deduplicated, layer-colored visual graph.

use crate::graph::TypeGraph;
use crate::key::TypeKey;
use crate::visual::{NodeRole, VisualEdge, VisualGraph, VisualNode, VisualizationSink};
use std::collections::{HashSet, btree_set};

/// Colors used for the root, alternating depths, and leaves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub root: String,
    /// Indexed by `layer % 2`.
    pub layers: [String; 2],
    pub leaf: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            root: "green".to_string(),
            layers: ["blue".to_string(), "purple".to_string()],
            leaf: "red".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializeOptions {
    pub palette: Palette,
    /// Mass given to every node.
    pub mass: u32,
}

impl Default for MaterializeOptions {
    fn default() -> Self {
        Self {
            palette: Palette::default(),
            mass: 10,
        }
    }
}

/// The input graph broke its contract: a referenced key has no entry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MaterializeError {
    #[error("root {0} has no entry in the relationship map")]
    MissingRoot(TypeKey),
    #[error("{key} is a subtype of {parent} but has no entry in the relationship map")]
    UnresolvedReference { parent: TypeKey, key: TypeKey },
}

/// Materialize `graph` from `root` into a fresh [`VisualGraph`].
pub fn materialize(
    graph: &TypeGraph,
    root: &TypeKey,
    options: &MaterializeOptions,
) -> Result<VisualGraph, MaterializeError> {
    let mut visual = VisualGraph::new();
    materialize_into(graph, root, options, &mut visual)?;
    Ok(visual)
}

struct Frame<'g> {
    parent: &'g TypeKey,
    children: btree_set::Iter<'g, TypeKey>,
    layer: usize,
}

/// Depth-first walk from `root`, driving `sink`.
///
/// A key reached a second time only gets the extra edge; its subtree was
/// already expanded under the first parent that reached it. Childless nodes
/// are recolored as leaves right after creation. The root keeps its own color
/// regardless of children.
pub fn materialize_into<S: VisualizationSink>(
    graph: &TypeGraph,
    root: &TypeKey,
    options: &MaterializeOptions,
    sink: &mut S,
) -> Result<(), MaterializeError> {
    let palette = &options.palette;
    let root_children = graph
        .children(root)
        .ok_or_else(|| MaterializeError::MissingRoot(root.clone()))?;

    sink.add_node(VisualNode {
        key: root.clone(),
        color: palette.root.clone(),
        mass: options.mass,
        module: root.module().to_string(),
        role: NodeRole::Root,
        physics: false,
    });

    let mut materialized: HashSet<&TypeKey> = HashSet::new();
    materialized.insert(root);
    let mut edges = 0usize;
    let mut leaves = 0usize;
    let mut deepest = 0usize;

    let mut stack = vec![Frame {
        parent: root,
        children: root_children.iter(),
        layer: 0,
    }];

    while let Some(frame) = stack.last_mut() {
        let Some(child) = frame.children.next() else {
            stack.pop();
            continue;
        };
        let parent = frame.parent;
        let layer = frame.layer;
        let edge = VisualEdge {
            parent: parent.clone(),
            child: child.clone(),
        };
        edges += 1;

        if !materialized.insert(child) {
            sink.add_edge(edge);
            continue;
        }

        let grandchildren =
            graph
                .children(child)
                .ok_or_else(|| MaterializeError::UnresolvedReference {
                    parent: parent.clone(),
                    key: child.clone(),
                })?;

        sink.add_node(VisualNode {
            key: child.clone(),
            color: palette.layers[layer % 2].clone(),
            mass: options.mass,
            module: child.module().to_string(),
            role: NodeRole::Branch,
            physics: true,
        });
        sink.add_edge(edge);
        deepest = deepest.max(layer);

        if grandchildren.is_empty() {
            sink.set_node_color(child, &palette.leaf, NodeRole::Leaf);
            leaves += 1;
        } else {
            stack.push(Frame {
                parent: child,
                children: grandchildren.iter(),
                layer: layer + 1,
            });
        }
    }

    tracing::info!(
        nodes = materialized.len(),
        edges,
        leaves,
        deepest_layer = deepest,
        "materialized graph"
    );
    Ok(())
}
