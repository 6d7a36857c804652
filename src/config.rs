//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/orgtree/orgtree.toml`
//! 3. Local config: `<dir>/.orgtree.toml`
//! 4. Environment variables: `ORGTREE_*` prefix, `__` as section separator

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::{SiblingOrder, MAX_DEPTH};

/// Structural limits of the unit forest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HierarchyConfig {
    /// Deepest allowed level; roots are level 1
    pub max_depth: usize,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
        }
    }
}

/// Presentation of tree and flat listings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TreeConfig {
    pub sibling_order: SiblingOrder,
}

/// Raw settings for intermediate parsing (`None` → not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub data_file: Option<PathBuf>,
    pub hierarchy: RawHierarchyConfig,
    pub tree: RawTreeConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawHierarchyConfig {
    pub max_depth: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawTreeConfig {
    pub sibling_order: Option<SiblingOrder>,
}

/// Unified configuration for orgtree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// JSON data file holding companies, units and process references
    pub data_file: PathBuf,
    pub hierarchy: HierarchyConfig,
    pub tree: TreeConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            hierarchy: HierarchyConfig::default(),
            tree: TreeConfig::default(),
        }
    }
}

/// Default data file under the platform data directory.
fn default_data_file() -> PathBuf {
    ProjectDirs::from("", "", "orgtree")
        .map(|dirs| dirs.data_dir().join("units.json"))
        .unwrap_or_else(|| PathBuf::from("~/.orgtree/units.json"))
}

/// Get the XDG config directory for orgtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "orgtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("orgtree.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".orgtree.toml")
}

/// Expand `~`, `$VAR` and `${VAR}` in a path string; unknown variables are left as-is.
pub fn expand_path(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            data_file: overlay
                .data_file
                .clone()
                .unwrap_or_else(|| self.data_file.clone()),
            hierarchy: HierarchyConfig {
                max_depth: overlay
                    .hierarchy
                    .max_depth
                    .unwrap_or(self.hierarchy.max_depth),
            },
            tree: TreeConfig {
                sibling_order: overlay
                    .tree
                    .sibling_order
                    .unwrap_or(self.tree.sibling_order),
            },
        }
    }

    fn expand_paths(&mut self) {
        let expanded = expand_path(self.data_file.to_string_lossy().as_ref());
        self.data_file = PathBuf::from(expanded);
    }

    fn validate(&self) -> Result<(), ApplicationError> {
        if self.hierarchy.max_depth < 1 {
            return Err(ApplicationError::Config {
                message: format!(
                    "hierarchy.max_depth must be at least 1, got {}",
                    self.hierarchy.max_depth
                ),
            });
        }
        Ok(())
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.orgtree.toml`
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let global = global_config_path().filter(|p| p.exists());
        let local = local_dir.map(local_config_path).filter(|p| p.exists());
        Self::load_from(global.as_deref(), local.as_deref())
    }

    /// Load from explicit file locations, then apply environment overrides.
    pub fn load_from(global: Option<&Path>, local: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        for path in [global, local].into_iter().flatten() {
            let raw = load_raw_settings(path)?;
            current = current.merge_with(&raw);
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();
        current.validate()?;
        Ok(current)
    }

    /// Apply ORGTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("ORGTREE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("data_file") {
            settings.data_file = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("hierarchy.max_depth") {
            settings.hierarchy.max_depth = val.parse().map_err(|e| ApplicationError::Config {
                message: format!("ORGTREE_HIERARCHY__MAX_DEPTH={val}: {e}"),
            })?;
        }
        if let Ok(val) = config.get_string("tree.sibling_order") {
            settings.tree.sibling_order = parse_sibling_order(&val)?;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# orgtree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/orgtree/orgtree.toml
#   Local:  <dir>/.orgtree.toml
#   Env:    ORGTREE_* environment variables (e.g. ORGTREE_HIERARCHY__MAX_DEPTH=4)

# JSON data file with companies, business units and process references
# data_file = "~/.local/share/orgtree/units.json"

[hierarchy]
# Deepest allowed level; roots are level 1
# max_depth = 3

[tree]
# Sibling ordering in tree and flat listings: "case-sensitive" or "case-insensitive"
# sibling_order = "case-sensitive"
"#
        .to_string()
    }
}

fn parse_sibling_order(value: &str) -> Result<SiblingOrder, ApplicationError> {
    match value.trim() {
        "case-sensitive" => Ok(SiblingOrder::CaseSensitive),
        "case-insensitive" => Ok(SiblingOrder::CaseInsensitive),
        other => Err(ApplicationError::Config {
            message: format!("unknown sibling order: {other}"),
        }),
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_no_config_when_loading_then_uses_defaults() {
        let settings = Settings::load_from(None, None).expect("load defaults");
        assert_eq!(settings.hierarchy.max_depth, MAX_DEPTH);
        assert_eq!(settings.tree.sibling_order, SiblingOrder::CaseSensitive);
        assert!(settings.data_file.to_string_lossy().ends_with("units.json"));
    }

    #[test]
    fn given_overlay_when_merging_then_overlay_wins_where_specified() {
        let base = Settings::default();
        let overlay = RawSettings {
            data_file: None,
            hierarchy: RawHierarchyConfig { max_depth: Some(5) },
            tree: RawTreeConfig::default(),
        };

        let merged = base.merge_with(&overlay);

        assert_eq!(merged.hierarchy.max_depth, 5);
        assert_eq!(merged.data_file, base.data_file);
        assert_eq!(merged.tree.sibling_order, base.tree.sibling_order);
    }

    #[test]
    fn given_tilde_in_data_file_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            data_file: PathBuf::from("~/orgtree/units.json"),
            ..Settings::default()
        };

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        assert!(settings.data_file.to_string_lossy().starts_with(&home));
    }

    #[test]
    fn given_zero_max_depth_when_validating_then_config_error() {
        let mut settings = Settings::default();
        settings.hierarchy.max_depth = 0;
        assert!(matches!(
            settings.validate(),
            Err(ApplicationError::Config { .. })
        ));
    }

    #[test]
    fn given_sibling_order_names_when_parsing_then_maps_variants() {
        assert_eq!(
            parse_sibling_order("case-insensitive").unwrap(),
            SiblingOrder::CaseInsensitive
        );
        assert!(parse_sibling_order("random").is_err());
    }
}
