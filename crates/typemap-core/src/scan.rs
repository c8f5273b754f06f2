//! Worklist scan of the subtype relation from a root.

use crate::graph::TypeGraph;
use crate::key::TypeKey;
use crate::source::{EnumerationError, SubtypeSource};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// A type whose subtypes could not be enumerated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanFailure {
    pub key: TypeKey,
    pub error: EnumerationError,
}

/// Result of a scan plus the degradations it tolerated.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    pub graph: TypeGraph,
    /// Types recorded with an empty child set because enumeration failed.
    pub failures: Vec<ScanFailure>,
    /// How many times an excluded identity was encountered and dropped.
    pub excluded_hits: usize,
}

/// Discover every subtype reachable from `root`, skipping `excluded`.
///
/// See [`scan_with_report`].
pub fn scan<S: SubtypeSource>(
    source: &S,
    root: &S::Type,
    excluded: &HashSet<S::Type>,
) -> TypeGraph {
    scan_with_report(source, root, excluded).graph
}

/// Discover every subtype reachable from `root`, skipping `excluded`.
///
/// Each identity enters the frontier at most once. A type whose enumeration
/// fails is logged and recorded with no children, so it still resolves when
/// referenced from its parent. An excluded root yields an empty graph.
pub fn scan_with_report<S: SubtypeSource>(
    source: &S,
    root: &S::Type,
    excluded: &HashSet<S::Type>,
) -> ScanReport {
    let mut relationships: BTreeMap<TypeKey, BTreeSet<TypeKey>> = BTreeMap::new();
    let mut failures = Vec::new();
    let mut excluded_hits = 0;

    // visited-or-pending
    let mut seen: HashSet<S::Type> = HashSet::new();
    let mut frontier: Vec<S::Type> = Vec::new();
    seen.insert(root.clone());
    frontier.push(root.clone());

    while let Some(current) = frontier.pop() {
        if excluded.contains(&current) {
            tracing::debug!(key = %source.key_of(&current), "skipping excluded type");
            excluded_hits += 1;
            continue;
        }

        let key = source.key_of(&current);
        let subtypes = match source.direct_subtypes(&current) {
            Ok(subtypes) => subtypes,
            Err(error) => {
                tracing::warn!(%key, %error, "subtype enumeration failed, recording as childless");
                relationships.entry(key.clone()).or_default();
                failures.push(ScanFailure { key, error });
                continue;
            }
        };

        let mut children = BTreeSet::new();
        for subtype in subtypes {
            if excluded.contains(&subtype) {
                tracing::debug!(parent = %key, child = %source.key_of(&subtype), "dropping excluded subtype");
                excluded_hits += 1;
                continue;
            }
            children.insert(source.key_of(&subtype));
            if seen.insert(subtype.clone()) {
                frontier.push(subtype);
            }
        }

        let entry = relationships.entry(key.clone()).or_default();
        if !entry.is_empty() {
            tracing::warn!(%key, "distinct types share one key, merging their subtypes");
        }
        entry.extend(children);
    }

    let graph: TypeGraph = relationships.into_iter().collect();
    tracing::info!(
        nodes = graph.len(),
        edges = graph.edge_count(),
        failures = failures.len(),
        excluded = excluded_hits,
        "scan complete"
    );

    ScanReport {
        graph,
        failures,
        excluded_hits,
    }
}
