//! Adjacency model for a discovered subtype hierarchy.

use crate::key::TypeKey;
use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};

/// Mapping from each discovered type to the set of its direct subtypes.
///
/// Every discovered node is a key exactly once, childless nodes map to the
/// empty set. The relation is not required to be a tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeGraph {
    relationships: BTreeMap<TypeKey, BTreeSet<TypeKey>>,
}

/// A child key that has no entry of its own in the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedReference {
    pub parent: TypeKey,
    pub child: TypeKey,
}

/// Structural integrity errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("{child} is referenced by {parent} but has no entry")]
    Unresolved { parent: TypeKey, child: TypeKey },
    #[error("root {0} has no entry")]
    MissingRoot(TypeKey),
}

/// Aggregate shape of a hierarchy as seen from a root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphStats {
    pub nodes: usize,
    pub edges: usize,
    pub leaves: usize,
    /// Length of the longest shortest-path from the root.
    pub max_depth: usize,
    /// The node with the most direct subtypes, and how many.
    pub widest: Option<(TypeKey, usize)>,
}

impl TypeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `node → children`, replacing any previous entry.
    pub fn insert(&mut self, node: TypeKey, children: BTreeSet<TypeKey>) {
        self.relationships.insert(node, children);
    }

    /// Add a childless entry for `key` unless it is already present.
    ///
    /// Returns true if the placeholder was added.
    pub fn insert_placeholder(&mut self, key: TypeKey) -> bool {
        if self.relationships.contains_key(&key) {
            return false;
        }
        self.relationships.insert(key, BTreeSet::new());
        true
    }

    /// Add placeholders for `keys`, skipping any key in `excluded`.
    ///
    /// Returns how many entries were added.
    pub fn insert_placeholders(
        &mut self,
        keys: impl IntoIterator<Item = TypeKey>,
        excluded: &HashSet<TypeKey>,
    ) -> usize {
        let mut added = 0;
        for key in keys {
            if excluded.contains(&key) {
                tracing::warn!(%key, "placeholder is also excluded, skipping");
                continue;
            }
            if self.insert_placeholder(key) {
                added += 1;
            }
        }
        added
    }

    pub fn children(&self, key: &TypeKey) -> Option<&BTreeSet<TypeKey>> {
        self.relationships.get(key)
    }

    pub fn contains(&self, key: &TypeKey) -> bool {
        self.relationships.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.relationships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relationships.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &TypeKey> {
        self.relationships.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TypeKey, &BTreeSet<TypeKey>)> {
        self.relationships.iter()
    }

    /// Total number of parent → child pairs.
    pub fn edge_count(&self) -> usize {
        self.relationships.values().map(BTreeSet::len).sum()
    }

    /// Keys with an empty child set.
    pub fn leaves(&self) -> impl Iterator<Item = &TypeKey> {
        self.relationships
            .iter()
            .filter(|(_, children)| children.is_empty())
            .map(|(key, _)| key)
    }

    /// Every (parent, child) pair whose child has no entry of its own.
    pub fn unresolved_references(&self) -> Vec<UnresolvedReference> {
        self.relationships
            .iter()
            .flat_map(|(parent, children)| {
                children
                    .iter()
                    .filter(|child| !self.relationships.contains_key(*child))
                    .map(move |child| UnresolvedReference {
                        parent: parent.clone(),
                        child: child.clone(),
                    })
            })
            .collect()
    }

    /// Check that `root` and every referenced child resolve to an entry.
    pub fn validate(&self, root: &TypeKey) -> Result<(), GraphError> {
        match self.problems(root).into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Every integrity error, a missing root first.
    pub fn problems(&self, root: &TypeKey) -> Vec<GraphError> {
        let mut problems = Vec::new();
        if !self.contains(root) {
            problems.push(GraphError::MissingRoot(root.clone()));
        }
        problems.extend(
            self.unresolved_references()
                .into_iter()
                .map(|UnresolvedReference { parent, child }| GraphError::Unresolved { parent, child }),
        );
        problems
    }

    /// Breadth-first statistics over the part of the graph reachable from `root`.
    pub fn stats(&self, root: &TypeKey) -> GraphStats {
        let mut stats = GraphStats::default();
        if !self.contains(root) {
            return stats;
        }

        let mut seen: HashSet<&TypeKey> = HashSet::new();
        let mut queue: VecDeque<(&TypeKey, usize)> = VecDeque::new();
        seen.insert(root);
        queue.push_back((root, 0));

        while let Some((key, depth)) = queue.pop_front() {
            stats.nodes += 1;
            stats.max_depth = stats.max_depth.max(depth);
            let Some(children) = self.relationships.get(key) else {
                // unresolved child, counted as a node with nothing below it
                stats.leaves += 1;
                continue;
            };
            stats.edges += children.len();
            if children.is_empty() {
                stats.leaves += 1;
            }
            if !children.is_empty()
                && stats
                    .widest
                    .as_ref()
                    .is_none_or(|(_, width)| children.len() > *width)
            {
                stats.widest = Some((key.clone(), children.len()));
            }
            for child in children {
                if seen.insert(child) {
                    queue.push_back((child, depth + 1));
                }
            }
        }

        stats
    }
}

impl FromIterator<(TypeKey, BTreeSet<TypeKey>)> for TypeGraph {
    fn from_iter<I: IntoIterator<Item = (TypeKey, BTreeSet<TypeKey>)>>(iter: I) -> Self {
        Self {
            relationships: iter.into_iter().collect(),
        }
    }
}
