//! # Editor State
//!
//! An immutable snapshot of a document: committed, frozen nodes indexed by
//! key. Snapshots share unchanged nodes with their predecessor through
//! `Arc`, so committing a transaction only allocates the nodes it touched.

use crate::codec::read_header;
use crate::errors::{CodecError, EditorError};
use crate::key::NodeKey;
use crate::node::{Node, NodeState};
use crate::node_type::{ImportContext, NodeKind, NodeType};
use crate::nodes::{RootNode, UnknownNode};
use crate::payload::NodePayload;
use crate::registry::NodeRegistry;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// A node replaced by a placeholder during import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveredNode {
    pub key: NodeKey,
    pub type_tag: String,
    pub reason: String,
}

/// Outcome of a whole-document import
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Nodes in the imported tree, placeholders and root included
    pub nodes: usize,
    pub recovered: Vec<RecoveredNode>,
}

impl ImportReport {
    pub fn is_clean(&self) -> bool {
        self.recovered.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct EditorState {
    nodes: HashMap<NodeKey, Arc<Node>>,
}

impl EditorState {
    /// A document holding only its root
    pub fn empty() -> Self {
        let mut root = Node::new(NodeKey::ROOT, RootNode::default().into());
        root.set_state(NodeState::Attached);
        root.freeze();

        let mut nodes = HashMap::new();
        nodes.insert(NodeKey::ROOT, Arc::new(root));
        Self { nodes }
    }

    pub(crate) fn from_nodes(nodes: HashMap<NodeKey, Arc<Node>>) -> Self {
        Self { nodes }
    }

    pub(crate) fn nodes(&self) -> &HashMap<NodeKey, Arc<Node>> {
        &self.nodes
    }

    pub fn root(&self) -> &Node {
        // Every constructor inserts the root and commits never collect it
        &self.nodes[&NodeKey::ROOT]
    }

    pub fn node(&self, key: NodeKey) -> Option<&Node> {
        self.nodes.get(&key).map(|n| n.as_ref())
    }

    /// Shared handle to a committed node
    pub fn node_arc(&self, key: NodeKey) -> Option<&Arc<Node>> {
        self.nodes.get(&key)
    }

    pub fn get<T: NodeType>(&self, key: NodeKey) -> Option<&T> {
        self.node(key).and_then(Node::get::<T>)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root().children().is_empty()
    }

    pub fn children_of(&self, key: NodeKey) -> Vec<&Node> {
        self.node(key)
            .map(|n| n.children().iter().filter_map(|c| self.node(*c)).collect())
            .unwrap_or_default()
    }

    /// Keys in document order (depth first, root first)
    pub fn keys_in_order(&self) -> Vec<NodeKey> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![NodeKey::ROOT];
        while let Some(key) = stack.pop() {
            if let Some(node) = self.node(key) {
                out.push(key);
                stack.extend(node.children().iter().rev());
            }
        }
        out
    }

    /// Every node of type `T`, in document order
    pub fn nodes_of_type<T: NodeType>(&self) -> Vec<(NodeKey, &T)> {
        self.keys_in_order()
            .into_iter()
            .filter_map(|key| self.get::<T>(key).map(|node| (key, node)))
            .collect()
    }

    pub fn text_content(&self) -> String {
        text_content_of(NodeKey::ROOT, &|key| self.node(key))
    }

    /// `{"root": {...}}`
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert("root".into(), self.node_json(NodeKey::ROOT));
        Value::Object(map)
    }

    fn node_json(&self, key: NodeKey) -> Value {
        let Some(node) = self.node(key) else {
            return Value::Null;
        };
        let payload = node.payload();
        if let NodePayload::Unknown(unknown) = payload {
            return Value::Object(unknown.raw().clone());
        }

        let mut map = payload.export_json();
        if node.kind().has_children() {
            let children = node.children().iter().map(|c| self.node_json(*c)).collect();
            map.insert("children".into(), Value::Array(children));
        }
        map.insert("type".into(), Value::String(payload.type_tag().to_string()));
        map.insert("version".into(), Value::from(payload.version()));
        Value::Object(map)
    }

    /// Rebuild a state from `{"root": {...}}`.
    ///
    /// A node that cannot be decoded is kept as an [`UnknownNode`] and listed in
    /// the report; only a missing or undecodable root fails the whole load.
    pub fn from_json(
        value: &Value,
        registry: &NodeRegistry,
    ) -> Result<(EditorState, ImportReport), EditorError> {
        let root = value
            .get("root")
            .and_then(Value::as_object)
            .ok_or_else(|| EditorError::DocumentLoad("missing root object".to_string()))?;

        let (type_tag, _) = read_header(root).map_err(load_error)?;
        if type_tag != RootNode::TYPE {
            return Err(EditorError::DocumentLoad(format!(
                "top-level node is '{}', expected 'root'",
                type_tag
            )));
        }

        let ctx = ImportContext { registry };
        let payload = registry
            .resolve(RootNode::TYPE)
            .map_err(load_error)?
            .decode(root, &ctx)
            .map_err(load_error)?;
        let children = children_array(root).map_err(load_error)?;

        let mut importer = Importer {
            ctx,
            nodes: HashMap::new(),
            report: ImportReport::default(),
        };
        let child_keys = children
            .iter()
            .map(|child| importer.import(child, NodeKey::ROOT))
            .collect();
        importer.insert(NodeKey::ROOT, None, child_keys, payload);

        let Importer { nodes, report, .. } = importer;
        debug!(
            nodes = report.nodes,
            recovered = report.recovered.len(),
            "Imported editor state"
        );
        Ok((EditorState { nodes }, report))
    }
}

impl Default for EditorState {
    fn default() -> Self {
        Self::empty()
    }
}

impl PartialEq for EditorState {
    /// Same document content; keys are not compared
    fn eq(&self, other: &Self) -> bool {
        self.to_json() == other.to_json()
    }
}

fn load_error(e: impl std::fmt::Display) -> EditorError {
    EditorError::DocumentLoad(e.to_string())
}

fn children_array(map: &Map<String, Value>) -> Result<&[Value], CodecError> {
    match map.get("children") {
        None | Some(Value::Null) => Ok(&[][..]),
        Some(Value::Array(items)) => Ok(items.as_slice()),
        Some(other) => Err(CodecError::malformed(
            map.get("type").and_then(Value::as_str).unwrap_or("?"),
            "children",
            format!("expected array, found {}", other),
        )),
    }
}

struct Importer<'a> {
    ctx: ImportContext<'a>,
    nodes: HashMap<NodeKey, Arc<Node>>,
    report: ImportReport,
}

impl Importer<'_> {
    fn import(&mut self, value: &Value, parent: NodeKey) -> NodeKey {
        let key = NodeKey::next();
        let Some(map) = value.as_object() else {
            let mut raw = Map::new();
            raw.insert("type".into(), Value::String("unknown".into()));
            raw.insert("value".into(), value.clone());
            self.recover(key, parent, raw, "node is not a JSON object".to_string());
            return key;
        };

        match self.decode(map) {
            Ok((payload, children)) => {
                let child_keys = children.iter().map(|c| self.import(c, key)).collect();
                self.insert(key, Some(parent), child_keys, payload);
            }
            Err(reason) => self.recover(key, parent, map.clone(), reason),
        }
        key
    }

    fn decode<'v>(&self, map: &'v Map<String, Value>) -> Result<(NodePayload, &'v [Value]), String> {
        let registry = self.ctx.registry;
        let (type_tag, _) = read_header(map).map_err(|e| e.to_string())?;
        let payload = registry
            .resolve(&type_tag)
            .map_err(|e| e.to_string())?
            .decode(map, &self.ctx)
            .map_err(|e| e.to_string())?;

        match payload.kind() {
            NodeKind::Root => Err("root node below the top level".to_string()),
            kind if kind.has_children() => {
                let children = children_array(map).map_err(|e| e.to_string())?;
                Ok((registry.apply_replacement(payload), children))
            }
            _ => Ok((registry.apply_replacement(payload), &[][..])),
        }
    }

    fn recover(&mut self, key: NodeKey, parent: NodeKey, raw: Map<String, Value>, reason: String) {
        let placeholder = UnknownNode::new(raw, reason.clone());
        warn!(
            key = %key,
            type_tag = placeholder.original_type(),
            reason = %reason,
            "Node replaced by placeholder"
        );
        self.report.recovered.push(RecoveredNode {
            key,
            type_tag: placeholder.original_type().to_string(),
            reason,
        });
        self.insert(key, Some(parent), Vec::new(), NodePayload::Unknown(placeholder));
    }

    fn insert(
        &mut self,
        key: NodeKey,
        parent: Option<NodeKey>,
        children: Vec<NodeKey>,
        payload: NodePayload,
    ) {
        let mut node = Node::new(key, payload);
        node.set_parent(parent);
        *node.children_mut() = children;
        node.set_state(NodeState::Attached);
        node.freeze();
        self.nodes.insert(key, Arc::new(node));
        self.report.nodes += 1;
    }
}

/// Text of a subtree. Block children of one element are separated by a blank line.
pub(crate) fn text_content_of<'a>(key: NodeKey, lookup: &dyn Fn(NodeKey) -> Option<&'a Node>) -> String {
    let Some(node) = lookup(key) else {
        return String::new();
    };
    let mut out = node.payload().own_text().unwrap_or_default();

    let mut previous_block = false;
    for (i, child_key) in node.children().iter().enumerate() {
        let Some(child) = lookup(*child_key) else {
            continue;
        };
        let is_block = !child.payload().is_inline();
        if i > 0 && (is_block || previous_block) {
            out.push_str("\n\n");
        }
        out.push_str(&text_content_of(*child_key, lookup));
        previous_block = is_block;
    }
    out
}
