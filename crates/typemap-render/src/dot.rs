//! Graphviz DOT output.

use std::fmt::Write;
use typemap_core::visual::{NodeRole, VisualGraph};

/// Export the graph as a DOT (Graphviz) string.
pub fn render_dot(graph: &VisualGraph) -> String {
    let mut out = String::new();
    writeln!(out, "digraph TypeMap {{").unwrap();
    writeln!(out, "  rankdir=TB;").unwrap();
    writeln!(out, "  node [shape=box, style=filled, fontsize=10];").unwrap();
    writeln!(out).unwrap();

    for node in graph.nodes() {
        let shape = match node.role {
            NodeRole::Root => "doubleoctagon",
            NodeRole::Branch => "box",
            NodeRole::Leaf => "ellipse",
        };
        writeln!(
            out,
            "  \"{}\" [shape={}, fillcolor=\"{}\", label=\"{}\", tooltip=\"{}\"];",
            escape(&node.key.to_string()),
            shape,
            escape(&node.color),
            escape(node.key.name()),
            escape(&node.module)
        )
        .unwrap();
    }

    writeln!(out).unwrap();

    for edge in graph.edges() {
        writeln!(
            out,
            "  \"{}\" -> \"{}\";",
            escape(&edge.parent.to_string()),
            escape(&edge.child.to_string())
        )
        .unwrap();
    }

    writeln!(out, "}}").unwrap();
    out
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
