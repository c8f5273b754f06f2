//! TOML type catalogs: a declared hierarchy loaded into a [`StaticSource`].

use crate::key::{KeyParseError, TypeKey};
use crate::source::StaticSource;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] toml::de::Error),
    #[error(transparent)]
    InvalidKey(#[from] KeyParseError),
}

#[derive(Debug, Deserialize)]
struct Catalog {
    #[serde(default)]
    types: Vec<CatalogType>,
}

#[derive(Debug, Deserialize)]
struct CatalogType {
    name: String,
    module: String,
    /// Parent keys in `"<name> <module>"` form.
    #[serde(default)]
    bases: Vec<String>,
    /// Enumeration of this type's subtypes fails.
    #[serde(default)]
    broken: bool,
}

/// Parse a catalog document. Bases that are never declared become known types.
pub fn from_toml(content: &str) -> Result<StaticSource, CatalogError> {
    let catalog: Catalog = toml::from_str(content)?;
    let mut source = StaticSource::new();
    for ty in catalog.types {
        let key = TypeKey::try_new(ty.name, ty.module)?;
        source.declare(key.clone());
        for base in &ty.bases {
            source.add_subtype(base.parse()?, key.clone());
        }
        if ty.broken {
            source.mark_failing(key);
        }
    }
    Ok(source)
}

/// Load a catalog file.
pub fn load(path: &Path) -> Result<StaticSource, CatalogError> {
    let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    from_toml(&content)
}
