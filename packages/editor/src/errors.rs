//! Error types for the editor

use crate::key::NodeKey;
use thiserror::Error;

/// Failures of the node type registry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Node type already registered: {0}")]
    DuplicateType(String),

    #[error("Unknown node type: {0}")]
    UnknownType(String),
}

/// Failures of the JSON and DOM codecs
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Schema mismatch: expected node type '{expected}', found '{found}'")]
    SchemaMismatch { expected: String, found: String },

    #[error("Unsupported version {version} for node type '{type_tag}'")]
    UnsupportedVersion { type_tag: String, version: u64 },

    #[error("Malformed field '{field}' on '{type_tag}': {reason}")]
    MalformedField {
        type_tag: String,
        field: String,
        reason: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CodecError {
    pub(crate) fn malformed(type_tag: &str, field: &str, reason: impl Into<String>) -> Self {
        CodecError::MalformedField {
            type_tag: type_tag.to_string(),
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Violations of the update protocol
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MutationError {
    #[error("Node mutation attempted outside of an update")]
    NotInUpdate,

    #[error("Update already in progress on this editor")]
    ReentrantUpdate,

    #[error("Node {0} was removed and cannot be mutated or reattached")]
    DetachedMutation(NodeKey),

    #[error("Node not found: {0}")]
    NodeNotFound(NodeKey),

    #[error("Node {0} cannot have children")]
    NotAnElement(NodeKey),

    #[error("Node {key} is '{found}', expected '{expected}'")]
    WrongType {
        key: NodeKey,
        expected: &'static str,
        found: String,
    },

    #[error("Would create cycle")]
    CycleDetected,

    #[error("The root node cannot be moved, replaced or removed")]
    RootImmutable,
}

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Mutation error: {0}")]
    Mutation(#[from] MutationError),

    #[error("Failed to load document: {0}")]
    DocumentLoad(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for EditorError {
    fn from(e: serde_json::Error) -> Self {
        EditorError::Codec(CodecError::Json(e))
    }
}

impl EditorError {
    /// The protocol violation behind this error, if any
    pub fn as_mutation(&self) -> Option<&MutationError> {
        match self {
            EditorError::Mutation(e) => Some(e),
            _ => None,
        }
    }
}
