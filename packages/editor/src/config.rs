use anyhow::Context;
use quarry_model::{BBox3, DEFAULT_LAYER_NAME};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_NAME: &str = "quarry.config.json";

/// Editor configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// Half extent of the cube every object must stay inside
    #[serde(default = "default_world_extent")]
    pub world_extent: f64,

    /// Undo history length (0 = unlimited)
    #[serde(default = "default_max_undo_levels")]
    pub max_undo_levels: usize,

    /// Merge successive compatible commands into one undo step
    #[serde(default = "default_collate_commands")]
    pub collate_commands: bool,

    /// Name given to the layer every new document starts with
    #[serde(default = "default_layer_name")]
    pub default_layer_name: String,
}

fn default_world_extent() -> f64 {
    16384.0
}

fn default_max_undo_levels() -> usize {
    100
}

fn default_collate_commands() -> bool {
    true
}

fn default_layer_name() -> String {
    DEFAULT_LAYER_NAME.to_string()
}

impl EditorConfig {
    /// Load config from a directory, falling back to defaults when no file exists
    pub fn load(dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        let config_path = dir.as_ref().join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("reading {}", config_path.display()))?;
            let config: EditorConfig = serde_json::from_str(&content)
                .with_context(|| format!("parsing {}", config_path.display()))?;
            Ok(config)
        } else {
            Ok(EditorConfig::default())
        }
    }

    pub fn world_bounds(&self) -> BBox3 {
        BBox3::cube(self.world_extent)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            world_extent: default_world_extent(),
            max_undo_levels: default_max_undo_levels(),
            collate_commands: default_collate_commands(),
            default_layer_name: default_layer_name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "worldExtent": 4096,
            "maxUndoLevels": 20,
            "collateCommands": false,
            "defaultLayerName": "Base"
        }"#;

        let config: EditorConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.world_extent, 4096.0);
        assert_eq!(config.max_undo_levels, 20);
        assert!(!config.collate_commands);
        assert_eq!(config.default_layer_name, "Base");
        assert_eq!(config.world_bounds(), BBox3::cube(4096.0));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: EditorConfig = serde_json::from_str(r#"{ "maxUndoLevels": 5 }"#).unwrap();
        assert_eq!(config.max_undo_levels, 5);
        assert_eq!(config.world_extent, 16384.0);
        assert!(config.collate_commands);
        assert_eq!(config.default_layer_name, "Default Layer");
    }

    #[test]
    fn test_load_missing_file_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = EditorConfig::load(dir.path()).unwrap();
        assert_eq!(config, EditorConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_NAME),
            r#"{ "worldExtent": 1024 }"#,
        )
        .unwrap();

        let config = EditorConfig::load(dir.path()).unwrap();
        assert_eq!(config.world_extent, 1024.0);
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(DEFAULT_CONFIG_NAME), "{ not json").unwrap();
        assert!(EditorConfig::load(dir.path()).is_err());
    }
}
