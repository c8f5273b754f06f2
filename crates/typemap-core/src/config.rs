//! Configuration for scanning, rendering, and storage.
//!
//! Load order: `.typemap/config.toml` → environment variables → defaults.

use crate::key::{KeyParseError, TypeKey};
use crate::materialize::{MaterializeOptions, Palette};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error(transparent)]
    InvalidKey(#[from] KeyParseError),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level typemap configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TypemapConfig {
    pub scan: ScanConfig,
    pub render: RenderConfig,
    pub storage: StorageConfig,
    pub source: SourceConfig,
}

/// Scanner inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Key of the type the scan starts from.
    pub root: String,
    /// Keys that are never expanded or recorded.
    pub exclude: Vec<String>,
    /// Keys added as childless entries after the scan.
    pub placeholders: Vec<String>,
}

/// Materialization and HTML page settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub root_color: String,
    /// Alternating colors for successive layers. Exactly two.
    pub layer_colors: Vec<String>,
    pub leaf_color: String,
    pub node_mass: u32,
    pub height: String,
    pub width: String,
    pub select_menu: bool,
    pub filter_menu: bool,
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Relationship file name inside `.typemap/`.
    pub file: String,
}

/// Path filters applied when collecting source files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            root: TypeKey::object().to_string(),
            exclude: Vec::new(),
            placeholders: Vec::new(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        let palette = Palette::default();
        Self {
            root_color: palette.root,
            layer_colors: palette.layers.to_vec(),
            leaf_color: palette.leaf,
            node_mass: MaterializeOptions::default().mass,
            height: "1000px".to_string(),
            width: "100%".to_string(),
            select_menu: true,
            filter_menu: true,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            file: "relationships.json".to_string(),
        }
    }
}

impl ScanConfig {
    pub fn root_key(&self) -> Result<TypeKey, KeyParseError> {
        self.root.parse()
    }

    pub fn excluded_keys(&self) -> Result<HashSet<TypeKey>, KeyParseError> {
        self.exclude.iter().map(|k| k.parse()).collect()
    }

    pub fn placeholder_keys(&self) -> Result<Vec<TypeKey>, KeyParseError> {
        self.placeholders.iter().map(|k| k.parse()).collect()
    }
}

impl RenderConfig {
    /// Palette for the materializer. Assumes a validated config.
    pub fn palette(&self) -> Palette {
        let layer = |i: usize| {
            self.layer_colors
                .get(i)
                .cloned()
                .unwrap_or_else(|| Palette::default().layers[i].clone())
        };
        Palette {
            root: self.root_color.clone(),
            layers: [layer(0), layer(1)],
            leaf: self.leaf_color.clone(),
        }
    }

    pub fn materialize_options(&self) -> MaterializeOptions {
        MaterializeOptions {
            palette: self.palette(),
            mass: self.node_mass,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.layer_colors.len() != 2 {
            return Err(ConfigError::Invalid(format!(
                "render.layer_colors must hold exactly 2 colors, found {}",
                self.layer_colors.len()
            )));
        }
        if self.root_color == self.leaf_color {
            return Err(ConfigError::Invalid(format!(
                "render.root_color and render.leaf_color are both {:?}",
                self.root_color
            )));
        }
        for (name, color) in [("root_color", &self.root_color), ("leaf_color", &self.leaf_color)] {
            if self.layer_colors.contains(color) {
                return Err(ConfigError::Invalid(format!(
                    "render.{} {:?} is also a layer color",
                    name, color
                )));
            }
        }
        Ok(())
    }
}

/// Helper to parse an env var and apply it to a config field.
fn env_override<T: std::str::FromStr>(var: &str, target: &mut T) {
    if let Ok(v) = std::env::var(var)
        && let Ok(n) = v.parse()
    {
        *target = n;
    }
}

impl TypemapConfig {
    /// Load config from `.typemap/config.toml` in the project root, with env var overrides.
    /// Falls back to defaults if no config file exists.
    pub fn load(project_root: &Path) -> Result<Self, ConfigError> {
        let config_path = project_root.join(".typemap").join("config.toml");

        let mut config = if config_path.exists() {
            let content =
                std::fs::read_to_string(&config_path).map_err(|source| ConfigError::Io {
                    path: config_path.clone(),
                    source,
                })?;
            toml::from_str(&content)?
        } else {
            Self::default()
        };

        env_override("TYPEMAP_ROOT", &mut config.scan.root);
        env_override("TYPEMAP_NODE_MASS", &mut config.render.node_mass);
        env_override("TYPEMAP_ROOT_COLOR", &mut config.render.root_color);
        env_override("TYPEMAP_LEAF_COLOR", &mut config.render.leaf_color);

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scan.root_key()?;
        let excluded = self.scan.excluded_keys()?;
        if let Some(key) = self
            .scan
            .placeholder_keys()?
            .into_iter()
            .find(|k| excluded.contains(k))
        {
            return Err(ConfigError::Invalid(format!(
                "scan.placeholders lists {} which is also in scan.exclude",
                key
            )));
        }
        self.render.validate()
    }

    /// Path of the relationship file for a project.
    pub fn relationships_path(&self, project_root: &Path) -> PathBuf {
        crate::store::typemap_dir(project_root).join(&self.storage.file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TypemapConfig::default();
        assert_eq!(config.scan.root, "object builtins");
        assert!(config.scan.exclude.is_empty());
        assert_eq!(config.render.layer_colors, vec!["blue", "purple"]);
        assert_eq!(config.render.root_color, "green");
        assert_eq!(config.render.leaf_color, "red");
        assert_eq!(config.render.node_mass, 10);
        assert_eq!(config.storage.file, "relationships.json");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_toml() {
        let toml_str = r##"
[scan]
exclude = ["type builtins"]
placeholders = ["str builtins"]

[render]
node_mass = 5
layer_colors = ["#1f77b4", "#9467bd"]
"##;
        let config: TypemapConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.render.node_mass, 5);
        assert_eq!(
            config.scan.excluded_keys().unwrap(),
            HashSet::from([TypeKey::new("type", "builtins")])
        );
        // Defaults for unspecified fields
        assert_eq!(config.scan.root, "object builtins");
        assert_eq!(config.render.leaf_color, "red");

        let options = config.render.materialize_options();
        assert_eq!(options.mass, 5);
        assert_eq!(options.palette.layers[1], "#9467bd");
    }

    #[test]
    fn test_config_load_nonexistent() {
        let config = TypemapConfig::load(Path::new("/nonexistent/path")).unwrap();
        assert_eq!(config.render.node_mass, 10);
    }

    #[test]
    fn test_rejects_leaf_color_shared_with_layer() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join(".typemap");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("config.toml"),
            "[render]\nleaf_color = \"blue\"\n",
        )
        .unwrap();

        let err = TypemapConfig::load(tmp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "got {err}");
    }

    #[test]
    fn test_rejects_placeholder_that_is_excluded() {
        let mut config = TypemapConfig::default();
        config.scan.exclude.push("type builtins".to_string());
        config.scan.placeholders.push("type builtins".to_string());
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_three_layer_colors() {
        let mut config = TypemapConfig::default();
        config.render.layer_colors.push("orange".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_malformed_exclusion_key() {
        let mut config = TypemapConfig::default();
        config.scan.exclude.push("type".to_string());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidKey(_))
        ));
    }
}
