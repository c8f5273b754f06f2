//! Read/write relationship files: the root key plus the full adjacency map.

use crate::graph::TypeGraph;
use crate::key::{KeyParseError, TypeKey};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

const TYPEMAP_DIR: &str = ".typemap";
const RELATIONSHIPS_FILE: &str = "relationships.json";
const CURRENT_VERSION: &str = "1";

/// Persistence failures. Never retried.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize relationships: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to deserialize relationships: {0}")]
    Decode(#[source] serde_json::Error),
    #[error(transparent)]
    InvalidKey(#[from] KeyParseError),
    #[error("relationship file version mismatch: expected {expected}, found {found}")]
    Version { expected: String, found: String },
}

/// On-disk shape of a relationship file.
#[derive(Debug, Serialize, Deserialize)]
struct RelationshipDocument {
    #[serde(default = "current_version")]
    version: String,
    start: String,
    #[serde(alias = "object_relationships")]
    relationships: BTreeMap<String, Vec<String>>,
}

fn current_version() -> String {
    CURRENT_VERSION.to_string()
}

/// Get the typemap directory for a given project root.
pub fn typemap_dir(project_root: &Path) -> PathBuf {
    project_root.join(TYPEMAP_DIR)
}

/// Get the default relationship file path for a given project root.
pub fn default_path(project_root: &Path) -> PathBuf {
    typemap_dir(project_root).join(RELATIONSHIPS_FILE)
}

/// Serialize a graph and its root to pretty-printed JSON.
///
/// Fails with [`StoreError::InvalidKey`] if any key would read back as a
/// different key.
pub fn to_json(graph: &TypeGraph, root: &TypeKey) -> Result<String, StoreError> {
    root.check()?;
    for (key, children) in graph.iter() {
        key.check()?;
        children.iter().try_for_each(TypeKey::check)?;
    }
    let document = RelationshipDocument {
        version: current_version(),
        start: root.to_string(),
        relationships: graph
            .iter()
            .map(|(key, children)| {
                (
                    key.to_string(),
                    children.iter().map(ToString::to_string).collect(),
                )
            })
            .collect(),
    };
    serde_json::to_string_pretty(&document).map_err(StoreError::Encode)
}

/// Deserialize a graph and its root from JSON.
pub fn from_json(json: &str) -> Result<(TypeGraph, TypeKey), StoreError> {
    let document: RelationshipDocument = serde_json::from_str(json).map_err(StoreError::Decode)?;
    if document.version != CURRENT_VERSION {
        return Err(StoreError::Version {
            expected: CURRENT_VERSION.to_string(),
            found: document.version,
        });
    }

    let root: TypeKey = document.start.parse()?;
    let mut graph = TypeGraph::new();
    for (key, children) in document.relationships {
        let children = children
            .iter()
            .map(|c| c.parse())
            .collect::<Result<BTreeSet<TypeKey>, _>>()?;
        graph.insert(key.parse()?, children);
    }
    Ok((graph, root))
}

/// Load a relationship file from `path`.
pub fn load(path: &Path) -> Result<(TypeGraph, TypeKey), StoreError> {
    let json = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    from_json(&json)
}

/// Save a relationship file to `path`, creating parent directories if needed.
pub fn save(path: &Path, graph: &TypeGraph, root: &TypeKey) -> Result<(), StoreError> {
    let json = to_json(graph, root)?;
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
    {
        fs::create_dir_all(dir).map_err(|source| StoreError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, json).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}
