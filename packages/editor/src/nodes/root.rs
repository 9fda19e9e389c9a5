use super::ElementFormat;
use crate::codec::JsonFields;
use crate::errors::CodecError;
use crate::node_type::{ImportContext, NodeKind, NodeType, Serializable};
use crate::payload::NodePayload;
use serde_json::{Map, Value};

/// Top of every document tree
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RootNode {
    pub format: ElementFormat,
}

impl Serializable for RootNode {
    fn export_json(&self) -> Map<String, Value> {
        let mut map = Map::new();
        self.format.write_json(&mut map);
        map
    }
}

impl NodeType for RootNode {
    const TYPE: &'static str = "root";
    const KIND: NodeKind = NodeKind::Root;

    fn import_json(fields: &JsonFields<'_>, _ctx: &ImportContext<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            format: ElementFormat::read_json(fields)?,
        })
    }

    fn downcast(payload: &NodePayload) -> Option<&Self> {
        match payload {
            NodePayload::Root(node) => Some(node),
            _ => None,
        }
    }

    fn downcast_mut(payload: &mut NodePayload) -> Option<&mut Self> {
        match payload {
            NodePayload::Root(node) => Some(node),
            _ => None,
        }
    }
}

impl From<RootNode> for NodePayload {
    fn from(node: RootNode) -> Self {
        NodePayload::Root(node)
    }
}
