use std::collections::{BTreeSet, HashMap, HashSet};
use typemap_core::graph::TypeGraph;
use typemap_core::key::TypeKey;
use typemap_core::materialize::{
    MaterializeError, MaterializeOptions, materialize, materialize_into,
};
use typemap_core::visual::{NodeRole, VisualEdge, VisualNode, VisualizationSink};

fn key(name: &str) -> TypeKey {
    TypeKey::new(name, "m")
}

fn graph(entries: &[(&str, &[&str])]) -> TypeGraph {
    entries
        .iter()
        .map(|(k, children)| (key(k), children.iter().map(|c| key(c)).collect()))
        .collect()
}

fn diamond() -> TypeGraph {
    graph(&[("R", &["A", "B"]), ("A", &["C"]), ("B", &["C"]), ("C", &[])])
}

fn edge(parent: &str, child: &str) -> VisualEdge {
    VisualEdge {
        parent: key(parent),
        child: key(child),
    }
}

#[test]
fn test_diamond_scenario() {
    let options = MaterializeOptions::default();
    let visual = materialize(&diamond(), &key("R"), &options).unwrap();

    let keys: BTreeSet<TypeKey> = visual.nodes().iter().map(|n| n.key.clone()).collect();
    assert_eq!(keys, ["R", "A", "B", "C"].iter().map(|n| key(n)).collect());
    assert_eq!(visual.node_count(), 4);

    let edges: HashSet<VisualEdge> = visual.edges().iter().cloned().collect();
    assert_eq!(visual.edge_count(), 4);
    assert_eq!(
        edges,
        HashSet::from([edge("R", "A"), edge("R", "B"), edge("A", "C"), edge("B", "C")])
    );

    let palette = &options.palette;
    let c = visual.node(&key("C")).unwrap();
    assert_eq!(c.color, palette.leaf);
    assert_eq!(c.role, NodeRole::Leaf);

    let a = visual.node(&key("A")).unwrap();
    let b = visual.node(&key("B")).unwrap();
    assert_eq!(a.color, palette.layers[0]);
    assert_eq!(a.color, b.color);
    assert_eq!(a.role, NodeRole::Branch);

    let r = visual.node(&key("R")).unwrap();
    assert_eq!(r.color, palette.root);
    assert_ne!(r.color, a.color);
    assert!(!r.physics);
    assert_eq!(visual.incoming(&key("C")).count(), 2);
}

#[test]
fn test_layers_alternate() {
    let chain = graph(&[("R", &["L0"]), ("L0", &["L1"]), ("L1", &["L2"]), ("L2", &["Leaf"]), ("Leaf", &[])]);
    let options = MaterializeOptions::default();
    let visual = materialize(&chain, &key("R"), &options).unwrap();
    let [even, odd] = &options.palette.layers;

    assert_eq!(&visual.node(&key("L0")).unwrap().color, even);
    assert_eq!(&visual.node(&key("L1")).unwrap().color, odd);
    assert_eq!(&visual.node(&key("L2")).unwrap().color, even);
    assert_eq!(visual.node(&key("Leaf")).unwrap().color, options.palette.leaf);
}

#[test]
fn test_exclusion_scenario() {
    // what the scanner produces when A is excluded
    let input = graph(&[("R", &["B"]), ("B", &[])]);
    let visual = materialize(&input, &key("R"), &MaterializeOptions::default()).unwrap();

    assert!(visual.node(&key("A")).is_none());
    assert!(visual.edges().iter().all(|e| e.child != key("A") && e.parent != key("A")));
    assert!(visual.node(&key("B")).is_some());
}

#[test]
fn test_childless_root_keeps_root_color() {
    let input = graph(&[("R", &[])]);
    let options = MaterializeOptions::default();
    let visual = materialize(&input, &key("R"), &options).unwrap();

    assert_eq!(visual.node_count(), 1);
    let root = visual.node(&key("R")).unwrap();
    assert_eq!(root.color, options.palette.root);
    assert_eq!(root.role, NodeRole::Root);
}

#[test]
fn test_cycle_to_root_adds_edge_only() {
    let input = graph(&[("R", &["A"]), ("A", &["R"])]);
    let options = MaterializeOptions::default();
    let visual = materialize(&input, &key("R"), &options).unwrap();

    assert_eq!(visual.node_count(), 2);
    assert_eq!(visual.edge_count(), 2);
    assert_eq!(visual.node(&key("R")).unwrap().color, options.palette.root);
}

#[test]
fn test_unresolved_child_is_fatal() {
    let input = graph(&[("R", &["A", "Missing"]), ("A", &[])]);
    let err = materialize(&input, &key("R"), &MaterializeOptions::default()).unwrap_err();
    assert_eq!(
        err,
        MaterializeError::UnresolvedReference {
            parent: key("R"),
            key: key("Missing"),
        }
    );
}

#[test]
fn test_missing_root_is_fatal() {
    let err = materialize(&TypeGraph::new(), &key("R"), &MaterializeOptions::default())
        .unwrap_err();
    assert_eq!(err, MaterializeError::MissingRoot(key("R")));
}

#[test]
fn test_deep_chain_does_not_overflow_stack() {
    let depth = 200_000;
    let mut input = TypeGraph::new();
    for i in 0..depth {
        input.insert(key(&format!("T{i}")), BTreeSet::from([key(&format!("T{}", i + 1))]));
    }
    input.insert(key(&format!("T{depth}")), BTreeSet::new());

    let visual = materialize(&input, &key("T0"), &MaterializeOptions::default()).unwrap();
    assert_eq!(visual.node_count(), depth + 1);
}

/// Records every call in order.
#[derive(Default)]
struct RecordingSink {
    added: Vec<VisualNode>,
    edges: Vec<VisualEdge>,
    recolored: HashMap<TypeKey, (String, NodeRole)>,
}

impl VisualizationSink for RecordingSink {
    fn add_node(&mut self, node: VisualNode) {
        self.added.push(node);
    }

    fn add_edge(&mut self, edge: VisualEdge) {
        self.edges.push(edge);
    }

    fn set_node_color(&mut self, key: &TypeKey, color: &str, role: NodeRole) {
        self.recolored.insert(key.clone(), (color.to_string(), role));
    }
}

#[test]
fn test_sink_sees_each_node_once_and_leaf_recolor() {
    let options = MaterializeOptions::default();
    let mut sink = RecordingSink::default();
    materialize_into(&diamond(), &key("R"), &options, &mut sink).unwrap();

    assert_eq!(sink.added.len(), 4);
    let c = sink.added.iter().find(|n| n.key == key("C")).unwrap();
    // created with its layer color, then overridden
    assert_eq!(c.color, options.palette.layers[1]);
    assert_eq!(
        sink.recolored.get(&key("C")),
        Some(&(options.palette.leaf.clone(), NodeRole::Leaf))
    );
    assert_eq!(sink.recolored.len(), 1);
    assert_eq!(sink.edges.len(), 4);
}

#[test]
fn test_replay_hands_off_final_colors() {
    let options = MaterializeOptions::default();
    let visual = materialize(&diamond(), &key("R"), &options).unwrap();
    let mut sink = RecordingSink::default();
    visual.replay(&mut sink);

    assert_eq!(sink.added.len(), 4);
    assert_eq!(sink.edges.len(), 4);
    assert!(sink.recolored.is_empty());
    let c = sink.added.iter().find(|n| n.key == key("C")).unwrap();
    assert_eq!(c.color, options.palette.leaf);
}
