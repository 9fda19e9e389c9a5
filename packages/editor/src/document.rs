//! # Saved Documents
//!
//! The on-disk envelope around a serialized editor state:
//!
//! ```json
//! {
//!   "editorState": { "root": { ... } },
//!   "lastSaved": 1718000000000,
//!   "source": "Playground",
//!   "version": "0.1.0"
//! }
//! ```

use crate::editor::Editor;
use crate::errors::EditorError;
use crate::registry::NodeRegistry;
use crate::state::{EditorState, ImportReport};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentJson {
    pub editor_state: Value,

    /// Epoch milliseconds
    pub last_saved: i64,

    pub source: String,

    /// Version of the editor that wrote the document
    pub version: String,
}

impl DocumentJson {
    /// Envelope for `state`, stamped with the current time
    pub fn new(state: &EditorState, source: impl Into<String>) -> Self {
        Self {
            editor_state: state.to_json(),
            last_saved: Utc::now().timestamp_millis(),
            source: source.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn last_saved_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.last_saved).single()
    }

    pub fn parse(content: &str) -> Result<Self, EditorError> {
        serde_json::from_str(content).map_err(|e| EditorError::DocumentLoad(e.to_string()))
    }

    pub fn to_string_pretty(&self) -> Result<String, EditorError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn read(path: impl AsRef<Path>) -> Result<Self, EditorError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), EditorError> {
        std::fs::write(path.as_ref(), self.to_string_pretty()?)?;
        info!(path = %path.as_ref().display(), "Document saved");
        Ok(())
    }

    /// Decode the embedded state, recovering undecodable nodes
    pub fn to_state(&self, registry: &NodeRegistry) -> Result<(EditorState, ImportReport), EditorError> {
        EditorState::from_json(&self.editor_state, registry)
    }
}

impl Editor {
    /// Envelope for the committed state, with the configured source
    pub fn export_document(&self) -> DocumentJson {
        DocumentJson::new(&self.state(), self.config().source.clone())
    }

    /// Replace the current state with the document's
    pub fn load_document(&self, document: &DocumentJson) -> Result<ImportReport, EditorError> {
        let report = self.load_state_json(&document.editor_state)?;
        info!(
            nodes = report.nodes,
            recovered = report.recovered.len(),
            source = %document.source,
            "Document loaded"
        );
        Ok(report)
    }
}
