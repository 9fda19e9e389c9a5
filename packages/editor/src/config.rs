use crate::errors::{EditorError, RegistryError};
use crate::node_type::NodeType;
use crate::nodes::{LinkNode, ParagraphNode, RootNode, TextNode};
use crate::registry::{builtin_descriptors, NodeDescriptor, NodeRegistry};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

pub const DEFAULT_CONFIG_NAME: &str = "playground.config.json";

/// Types every document needs, registered whatever `nodes` says
const REQUIRED_TYPES: [&str; 3] = [RootNode::TYPE, ParagraphNode::TYPE, TextNode::TYPE];

/// Per-document editor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// Enabled node type tags
    #[serde(default = "default_nodes")]
    pub nodes: Vec<String>,

    /// DOM import priority overrides, keyed by type tag
    #[serde(default)]
    pub dom_priorities: HashMap<String, u8>,

    /// Read links whose `rel` is `CUR,AMOUNT,CATEGORY` as budget links
    #[serde(default = "default_true")]
    pub upgrade_legacy_budget_links: bool,

    /// Written into saved documents
    #[serde(default = "default_source")]
    pub source: String,
}

fn default_nodes() -> Vec<String> {
    builtin_descriptors()
        .iter()
        .map(|d| d.type_tag().to_string())
        .collect()
}

fn default_true() -> bool {
    true
}

fn default_source() -> String {
    "Playground".to_string()
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            nodes: default_nodes(),
            dom_priorities: HashMap::new(),
            upgrade_legacy_budget_links: true,
            source: default_source(),
        }
    }
}

impl EditorConfig {
    /// Load `playground.config.json` from a directory, or the default when absent
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, EditorError> {
        let path = dir.as_ref().join(DEFAULT_CONFIG_NAME);
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, EditorError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Registry holding the enabled types with their overrides applied
    pub fn build_registry(&self) -> Result<NodeRegistry, EditorError> {
        let mut available: HashMap<&str, NodeDescriptor> = builtin_descriptors()
            .into_iter()
            .map(|d| (d.type_tag(), d))
            .collect();

        let mut registry = NodeRegistry::new();
        let enabled = REQUIRED_TYPES.iter().copied().chain(
            self.nodes
                .iter()
                .map(String::as_str)
                .filter(|tag| !REQUIRED_TYPES.contains(tag)),
        );
        for tag in enabled {
            let Some(mut descriptor) = available.remove(tag) else {
                let err = if registry.contains(tag) {
                    RegistryError::DuplicateType(tag.to_string())
                } else {
                    RegistryError::UnknownType(tag.to_string())
                };
                return Err(err.into());
            };
            if tag == LinkNode::TYPE && !self.upgrade_legacy_budget_links {
                descriptor = NodeDescriptor::of::<LinkNode>();
            }
            if let Some(priority) = self.dom_priorities.get(tag) {
                descriptor = descriptor.with_dom_priority(*priority);
            }
            registry.register(descriptor)?;
        }
        Ok(registry)
    }
}
