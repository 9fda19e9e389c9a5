//! # Node Capabilities
//!
//! Node types do not inherit from a base class. Each concrete type is a
//! plain struct that composes capabilities:
//!
//! - [`Serializable`]: JSON field export (the codec stamps `type`/`version`)
//! - [`DomConvertible`]: markup export
//! - [`NodeType`]: static identity, JSON import and DOM import conversions
//!
//! The structural side (key, parent, children, lifecycle) lives on
//! [`crate::Node`] and is the same for every type.

use crate::codec::JsonFields;
use crate::errors::CodecError;
use crate::payload::NodePayload;
use crate::registry::NodeRegistry;
use playground_dom::{DomElement, DomNode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Structural role of a node in the document tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Root,
    Element,
    Decorator,
    Text,
}

impl NodeKind {
    /// Whether nodes of this kind own ordered children
    pub fn has_children(self) -> bool {
        matches!(self, NodeKind::Root | NodeKind::Element)
    }
}

/// JSON field export
pub trait Serializable {
    /// Type-specific fields; `type`, `version` and `children` are added by the codec
    fn export_json(&self) -> Map<String, Value>;
}

/// Markup export
pub trait DomConvertible {
    /// Element nodes get their children's markup appended by the exporter
    fn export_dom(&self) -> DomNode;
}

/// Converts a concrete element into a node, or declines with `None`
pub type DomConvertFn = fn(&DomElement) -> Option<NodePayload>;

/// One DOM import rule: a tag claimed by a node type at some priority
#[derive(Debug, Clone, Copy)]
pub struct DomConversion {
    pub tag: &'static str,
    pub priority: u8,
    pub convert: DomConvertFn,
}

impl DomConversion {
    pub fn new(tag: &'static str, priority: u8, convert: DomConvertFn) -> Self {
        Self {
            tag,
            priority,
            convert,
        }
    }
}

/// State available to JSON decoders
pub struct ImportContext<'a> {
    pub registry: &'a NodeRegistry,
}

/// Static identity and import behavior of a concrete node type
pub trait NodeType: Serializable + Clone + Into<NodePayload> + 'static {
    /// Type tag used in JSON and the registry
    const TYPE: &'static str;

    /// Current JSON schema version
    const VERSION: u64 = 1;

    const KIND: NodeKind;

    /// Rebuild the node from its exported fields
    fn import_json(fields: &JsonFields<'_>, ctx: &ImportContext<'_>) -> Result<Self, CodecError>;

    /// Upgrade fields written by an older schema version to the current one
    fn migrate(version: u64, fields: Map<String, Value>) -> Result<Map<String, Value>, CodecError> {
        if version == Self::VERSION {
            Ok(fields)
        } else {
            Err(CodecError::UnsupportedVersion {
                type_tag: Self::TYPE.to_string(),
                version,
            })
        }
    }

    fn import_dom() -> Vec<DomConversion> {
        Vec::new()
    }

    fn downcast(payload: &NodePayload) -> Option<&Self>;

    fn downcast_mut(payload: &mut NodePayload) -> Option<&mut Self>;
}
