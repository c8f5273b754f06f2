//! Mermaid flowchart output.

use std::collections::HashMap;
use std::fmt::Write;
use typemap_core::key::TypeKey;
use typemap_core::visual::VisualGraph;

/// Export the graph as a Mermaid flowchart.
///
/// Node ids are positional (`n0`, `n1`, ...) because type keys contain
/// characters Mermaid does not accept in identifiers.
pub fn render_mermaid(graph: &VisualGraph) -> String {
    let ids: HashMap<&TypeKey, String> = graph
        .nodes()
        .iter()
        .enumerate()
        .map(|(i, node)| (&node.key, format!("n{}", i)))
        .collect();

    let mut out = String::new();
    writeln!(out, "flowchart TD").unwrap();
    for node in graph.nodes() {
        writeln!(out, "  {}[\"{}\"]", ids[&node.key], label(&node.key.to_string())).unwrap();
    }
    for edge in graph.edges() {
        if let (Some(parent), Some(child)) = (ids.get(&edge.parent), ids.get(&edge.child)) {
            writeln!(out, "  {} --> {}", parent, child).unwrap();
        }
    }
    for node in graph.nodes() {
        writeln!(out, "  style {} fill:{}", ids[&node.key], node.color).unwrap();
    }
    out
}

fn label(s: &str) -> String {
    s.replace('"', "#quot;")
}
