//! Standalone interactive HTML page backed by vis-network.

use serde::Serialize;
use std::fmt::Write;
use typemap_core::visual::VisualGraph;

const VIS_NETWORK_JS: &str =
    "https://unpkg.com/vis-network@9.1.9/standalone/umd/vis-network.min.js";

/// Page layout and menu settings.
#[derive(Debug, Clone)]
pub struct HtmlOptions {
    pub title: String,
    pub height: String,
    pub width: String,
    /// Dropdown that selects and focuses a node.
    pub select_menu: bool,
    /// Dropdowns that show only nodes matching a module or role.
    pub filter_menu: bool,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            title: "typemap".to_string(),
            height: "1000px".to_string(),
            width: "100%".to_string(),
            select_menu: true,
            filter_menu: true,
        }
    }
}

#[derive(Serialize)]
struct JsNode<'a> {
    id: String,
    label: String,
    title: String,
    color: &'a str,
    mass: u32,
    module: &'a str,
    #[serde(rename = "type")]
    role: &'static str,
    physics: bool,
}

#[derive(Serialize)]
struct JsEdge {
    from: String,
    to: String,
}

/// Render the graph as a self-contained HTML document.
pub fn render_html(graph: &VisualGraph, options: &HtmlOptions) -> String {
    let nodes: Vec<JsNode> = graph
        .nodes()
        .iter()
        .map(|node| JsNode {
            id: node.key.to_string(),
            label: node.key.to_string(),
            title: format!("{} ({})", node.key.name(), node.module),
            color: &node.color,
            mass: node.mass,
            module: &node.module,
            role: node.role.as_str(),
            physics: node.physics,
        })
        .collect();
    let edges: Vec<JsEdge> = graph
        .edges()
        .iter()
        .map(|edge| JsEdge {
            from: edge.parent.to_string(),
            to: edge.child.to_string(),
        })
        .collect();

    let mut out = String::new();
    writeln!(out, "<!DOCTYPE html>").unwrap();
    writeln!(out, "<html>").unwrap();
    writeln!(out, "<head>").unwrap();
    writeln!(out, "  <meta charset=\"utf-8\">").unwrap();
    writeln!(out, "  <title>{}</title>", escape_html(&options.title)).unwrap();
    writeln!(out, "  <script src=\"{}\"></script>", VIS_NETWORK_JS).unwrap();
    writeln!(out, "  <style>").unwrap();
    writeln!(
        out,
        "    #typemap {{ width: {}; height: {}; border: 1px solid lightgray; }}",
        escape_css(&options.width),
        escape_css(&options.height)
    )
    .unwrap();
    writeln!(out, "    .menu {{ margin: 0.5em 0; font-family: sans-serif; }}").unwrap();
    writeln!(out, "  </style>").unwrap();
    writeln!(out, "</head>").unwrap();
    writeln!(out, "<body>").unwrap();

    if options.select_menu {
        writeln!(
            out,
            "  <div class=\"menu\">Select a node: <select id=\"select-node\"><option value=\"\">--</option></select></div>"
        )
        .unwrap();
    }
    if options.filter_menu {
        writeln!(
            out,
            "  <div class=\"menu\">Filter: <select id=\"filter-attr\"><option value=\"\">--</option><option value=\"module\">module</option><option value=\"type\">type</option></select> <select id=\"filter-value\"><option value=\"\">--</option></select> <button id=\"filter-reset\">Reset</button></div>"
        )
        .unwrap();
    }
    writeln!(out, "  <div id=\"typemap\"></div>").unwrap();

    writeln!(out, "  <script>").unwrap();
    writeln!(
        out,
        "    var nodes = new vis.DataSet({});",
        script_json(&nodes)
    )
    .unwrap();
    writeln!(
        out,
        "    var edges = new vis.DataSet({});",
        script_json(&edges)
    )
    .unwrap();
    out.push_str(NETWORK_SCRIPT);
    if options.select_menu {
        out.push_str(SELECT_SCRIPT);
    }
    if options.filter_menu {
        out.push_str(FILTER_SCRIPT);
    }
    writeln!(out, "  </script>").unwrap();
    writeln!(out, "</body>").unwrap();
    writeln!(out, "</html>").unwrap();
    out
}

const NETWORK_SCRIPT: &str = r#"    var container = document.getElementById("typemap");
    var network = new vis.Network(container, { nodes: nodes, edges: edges }, {
      edges: { arrows: { to: { enabled: true } } },
      physics: { stabilization: { iterations: 200 } }
    });
"#;

const SELECT_SCRIPT: &str = r#"    var select = document.getElementById("select-node");
    nodes.getIds().sort().forEach(function (id) {
      var option = document.createElement("option");
      option.value = id;
      option.textContent = id;
      select.appendChild(option);
    });
    select.addEventListener("change", function () {
      if (!select.value) { network.unselectAll(); return; }
      network.selectNodes([select.value]);
      network.focus(select.value, { scale: 1.0, animation: true });
    });
"#;

const FILTER_SCRIPT: &str = r#"    var filterAttr = document.getElementById("filter-attr");
    var filterValue = document.getElementById("filter-value");
    function showAll() {
      nodes.update(nodes.get().map(function (n) { return { id: n.id, hidden: false }; }));
    }
    filterAttr.addEventListener("change", function () {
      filterValue.length = 1;
      var seen = {};
      nodes.get().forEach(function (n) { seen[n[filterAttr.value]] = true; });
      Object.keys(seen).sort().forEach(function (v) {
        if (!filterAttr.value) { return; }
        var option = document.createElement("option");
        option.value = v;
        option.textContent = v;
        filterValue.appendChild(option);
      });
    });
    filterValue.addEventListener("change", function () {
      if (!filterValue.value) { showAll(); return; }
      var attr = filterAttr.value;
      nodes.update(nodes.get().map(function (n) {
        return { id: n.id, hidden: n[attr] !== filterValue.value };
      }));
    });
    document.getElementById("filter-reset").addEventListener("click", function () {
      filterAttr.value = "";
      filterValue.length = 1;
      showAll();
    });
"#;

/// JSON safe to embed inside a `<script>` element.
fn script_json<T: Serialize>(value: &T) -> String {
    // serializing plain structs of strings and numbers cannot fail
    serde_json::to_string(value)
        .unwrap_or_else(|_| "[]".to_string())
        .replace("</", "<\\/")
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn escape_css(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '%' | '.' | '-'))
        .collect()
}
