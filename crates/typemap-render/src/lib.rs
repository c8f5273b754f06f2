//! Artifact renderers for a materialized [`VisualGraph`].

pub mod dot;
pub mod html;
pub mod mermaid;

use std::str::FromStr;
use typemap_core::visual::VisualGraph;

pub use html::HtmlOptions;

/// Output format for a rendered hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Interactive vis-network page.
    Html,
    Dot,
    Mermaid,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Html => "html",
            ExportFormat::Dot => "dot",
            ExportFormat::Mermaid => "mmd",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "html" => Ok(ExportFormat::Html),
            "dot" | "graphviz" => Ok(ExportFormat::Dot),
            "mermaid" | "md" => Ok(ExportFormat::Mermaid),
            _ => Err(format!(
                "Unknown export format: {}. Use 'html', 'dot' or 'mermaid'.",
                s
            )),
        }
    }
}

/// Render the graph in the given format.
pub fn export(graph: &VisualGraph, format: ExportFormat, options: &HtmlOptions) -> String {
    match format {
        ExportFormat::Html => html::render_html(graph, options),
        ExportFormat::Dot => dot::render_dot(graph),
        ExportFormat::Mermaid => mermaid::render_mermaid(graph),
    }
}
