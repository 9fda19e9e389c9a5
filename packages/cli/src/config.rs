use anyhow::{Context, Result};
use playground_editor::{Editor, EditorConfig, DEFAULT_CONFIG_NAME};
use std::path::Path;
use tracing::debug;

/// Load the editor config of a directory, or the default when there is none
pub fn load(cwd: &Path) -> Result<EditorConfig> {
    let config = EditorConfig::load(cwd)
        .with_context(|| format!("Failed to read {} in {}", DEFAULT_CONFIG_NAME, cwd.display()))?;
    debug!(source = %config.source, nodes = config.nodes.len(), "Config loaded");
    Ok(config)
}

/// Editor configured for a directory
pub fn editor_for(cwd: &Path) -> Result<Editor> {
    let config = load(cwd)?;
    Editor::new(config).context("Invalid node configuration")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("playground-cli-{}-{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_missing_config_uses_defaults() {
        let dir = temp_dir("defaults");
        let config = load(&dir).unwrap();
        assert_eq!(config, EditorConfig::default());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_unknown_node_type_is_rejected() {
        let dir = temp_dir("unknown-type");
        fs::write(dir.join(DEFAULT_CONFIG_NAME), r#"{"nodes": ["youtube"]}"#).unwrap();

        let err = editor_for(&dir).err().unwrap();
        assert!(format!("{:#}", err).contains("Unknown node type: youtube"));
        fs::remove_dir_all(&dir).unwrap();
    }
}
