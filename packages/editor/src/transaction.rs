//! # Update Transactions
//!
//! A transaction overlays per-key drafts on top of a committed
//! [`EditorState`]. Reads prefer the draft of a key when one exists and fall
//! back to the committed node otherwise. `get_writable` creates at most one
//! draft per key; later calls return the same draft.
//!
//! Committing swaps the drafts into a new snapshot and drops nodes no longer
//! reachable from the root. Dropping the transaction without committing
//! discards every draft.

use crate::errors::{EditorError, MutationError, RegistryError};
use crate::html::{import_dom_nodes, ImportedNode};
use crate::key::NodeKey;
use crate::node::{Node, NodeState};
use crate::node_type::NodeType;
use crate::nodes::{link_text_for, ParagraphNode, TextLinkNode, TextNode};
use crate::payload::NodePayload;
use crate::registry::NodeRegistry;
use crate::state::{text_content_of, EditorState};
use playground_dom::DomNode;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, trace};
use url::Url;

pub struct Transaction<'a> {
    registry: &'a NodeRegistry,
    base: &'a EditorState,
    // Boxed so a draft keeps its address while the map grows
    drafts: HashMap<NodeKey, Box<Node>>,
}

impl<'a> Transaction<'a> {
    pub(crate) fn new(registry: &'a NodeRegistry, base: &'a EditorState) -> Self {
        Self {
            registry,
            base,
            drafts: HashMap::new(),
        }
    }

    pub fn registry(&self) -> &NodeRegistry {
        self.registry
    }

    /// The state this transaction started from
    pub fn committed(&self) -> &EditorState {
        self.base
    }

    /// Current view of a node: its draft if one exists, else the committed node
    pub fn node(&self, key: NodeKey) -> Option<&Node> {
        match self.drafts.get(&key) {
            Some(draft) => Some(draft.as_ref()),
            None => self.base.node(key),
        }
    }

    pub fn get<T: NodeType>(&self, key: NodeKey) -> Option<&T> {
        self.node(key).and_then(Node::get::<T>)
    }

    pub fn root(&self) -> &Node {
        match self.drafts.get(&NodeKey::ROOT) {
            Some(draft) => draft.as_ref(),
            None => self.base.root(),
        }
    }

    pub fn children(&self, key: NodeKey) -> Vec<NodeKey> {
        self.node(key).map(|n| n.children().to_vec()).unwrap_or_default()
    }

    pub fn text_content(&self, key: NodeKey) -> String {
        text_content_of(key, &|k| self.node(k))
    }

    pub fn is_draft(&self, key: NodeKey) -> bool {
        self.drafts.contains_key(&key)
    }

    pub fn draft_count(&self) -> usize {
        self.drafts.len()
    }

    fn require(&self, key: NodeKey) -> Result<&Node, MutationError> {
        self.node(key).ok_or(MutationError::NodeNotFound(key))
    }

    /// Draft of a node, created from the committed node on first use
    fn draft_mut(&mut self, key: NodeKey) -> Result<&mut Node, MutationError> {
        match self.drafts.entry(key) {
            Entry::Occupied(entry) => Ok(entry.into_mut().as_mut()),
            Entry::Vacant(entry) => {
                let committed = self.base.node(key).ok_or(MutationError::NodeNotFound(key))?;
                let mut draft = committed.clone_in_place();
                draft.thaw();
                trace!(key = %key, type_tag = draft.type_tag(), "Draft created");
                Ok(entry.insert(Box::new(draft)).as_mut())
            }
        }
    }

    /// Writable draft of a node; the same draft for every call in this transaction
    pub fn get_writable(&mut self, key: NodeKey) -> Result<&mut Node, EditorError> {
        let draft = self.draft_mut(key)?;
        draft.check_writable()?;
        Ok(draft)
    }

    /// Writable typed payload of a node
    pub fn writable<T: NodeType>(&mut self, key: NodeKey) -> Result<&mut T, EditorError> {
        Ok(self.get_writable(key)?.payload_mut::<T>()?)
    }

    /// Create an unattached node. The registry's replacement step may substitute it.
    pub fn create_node(&mut self, payload: impl Into<NodePayload>) -> Result<NodeKey, EditorError> {
        let payload = payload.into();
        if matches!(payload, NodePayload::Unknown(_)) || !self.registry.contains(payload.type_tag()) {
            return Err(RegistryError::UnknownType(payload.type_tag().to_string()).into());
        }
        let payload = self.registry.apply_replacement(payload);

        let key = NodeKey::next();
        debug!(key = %key, type_tag = payload.type_tag(), "Node created");
        self.drafts.insert(key, Box::new(Node::new(key, payload)));
        Ok(key)
    }

    /// Text link labelled with text derived from the URL
    pub fn create_text_link(&mut self, url: &str) -> Result<NodeKey, EditorError> {
        let label = match Url::parse(url) {
            Ok(parsed) => link_text_for(&parsed),
            Err(_) => url.to_string(),
        };
        let link = self.create_node(TextLinkNode::new(url))?;
        let text = self.create_node(TextNode::new(label))?;
        self.append(link, text)?;
        Ok(link)
    }

    pub fn append(&mut self, parent: NodeKey, child: NodeKey) -> Result<(), EditorError> {
        self.insert_at(parent, usize::MAX, child)
    }

    /// Insert `child` at `index` (clamped) in `parent`, detaching it from its current parent
    pub fn insert_at(
        &mut self,
        parent: NodeKey,
        index: usize,
        child: NodeKey,
    ) -> Result<(), EditorError> {
        if child.is_root() {
            return Err(MutationError::RootImmutable.into());
        }
        let child_node = self.require(child)?;
        if child_node.state() == NodeState::Removed {
            return Err(MutationError::DetachedMutation(child).into());
        }
        let previous_parent = child_node.parent();

        let parent_node = self.require(parent)?;
        if parent_node.state() == NodeState::Removed {
            return Err(MutationError::DetachedMutation(parent).into());
        }
        if !parent_node.kind().has_children() {
            return Err(MutationError::NotAnElement(parent).into());
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(MutationError::CycleDetected.into());
        }

        let mut index = index;
        if let Some(old_parent) = previous_parent {
            let siblings = self.draft_mut(old_parent)?.children_mut();
            if let Some(position) = siblings.iter().position(|k| *k == child) {
                siblings.remove(position);
                if old_parent == parent && position < index {
                    index -= 1;
                }
            }
        }

        let siblings = self.draft_mut(parent)?.children_mut();
        let index = index.min(siblings.len());
        siblings.insert(index, child);

        let child_node = self.draft_mut(child)?;
        child_node.set_parent(Some(parent));
        child_node.set_state(NodeState::Attached);
        Ok(())
    }

    fn is_ancestor_or_self(&self, candidate: NodeKey, mut key: NodeKey) -> bool {
        loop {
            if key == candidate {
                return true;
            }
            match self.node(key).and_then(Node::parent) {
                Some(parent) => key = parent,
                None => return false,
            }
        }
    }

    /// Detach a node and mark it and its descendants removed
    pub fn remove(&mut self, key: NodeKey) -> Result<(), EditorError> {
        if key.is_root() {
            return Err(MutationError::RootImmutable.into());
        }
        let node = self.require(key)?;
        if node.state() == NodeState::Removed {
            return Err(MutationError::DetachedMutation(key).into());
        }

        if let Some(parent) = node.parent() {
            self.draft_mut(parent)?.children_mut().retain(|k| *k != key);
        }
        self.draft_mut(key)?.set_parent(None);

        let mut stack = vec![key];
        while let Some(current) = stack.pop() {
            let draft = self.draft_mut(current)?;
            draft.set_state(NodeState::Removed);
            stack.extend(draft.children().iter().copied());
        }
        debug!(key = %key, "Node removed");
        Ok(())
    }

    /// Put a new node where `key` is, remove `key`, and return the new node's key
    pub fn replace(
        &mut self,
        key: NodeKey,
        payload: impl Into<NodePayload>,
        include_children: bool,
    ) -> Result<NodeKey, EditorError> {
        if key.is_root() {
            return Err(MutationError::RootImmutable.into());
        }
        let old = self.require(key)?;
        if old.state() == NodeState::Removed {
            return Err(MutationError::DetachedMutation(key).into());
        }
        let parent = old.parent();
        let position = parent
            .and_then(|p| self.node(p))
            .and_then(|p| p.children().iter().position(|k| *k == key));

        let replacement = self.create_node(payload)?;
        if include_children {
            for child in self.children(key) {
                self.append(replacement, child)?;
            }
        }
        if let (Some(parent), Some(position)) = (parent, position) {
            self.insert_at(parent, position, replacement)?;
        }
        self.remove(key)?;
        Ok(replacement)
    }

    /// Deep copy of a subtree with fresh keys; the copy is unattached
    pub fn duplicate(&mut self, key: NodeKey) -> Result<NodeKey, EditorError> {
        if key.is_root() {
            return Err(MutationError::RootImmutable.into());
        }
        let source = self.require(key)?;
        let copy = source.duplicate();
        let children = source.children().to_vec();

        let copy_key = copy.key();
        self.drafts.insert(copy_key, Box::new(copy));
        for child in children {
            let child_copy = self.duplicate(child)?;
            self.append(copy_key, child_copy)?;
        }
        Ok(copy_key)
    }

    /// Import markup below `parent`. Under the root, runs of inline nodes are
    /// wrapped in paragraphs. Returns the keys of the top-level nodes inserted.
    pub fn append_dom(&mut self, parent: NodeKey, nodes: &[DomNode]) -> Result<Vec<NodeKey>, EditorError> {
        let imported = import_dom_nodes(self.registry, nodes);
        let wrap_inline = parent.is_root();

        let mut inserted = Vec::new();
        let mut paragraph: Option<NodeKey> = None;
        for node in imported {
            let is_inline = node.payload.is_inline();
            let key = self.build_imported(node)?;
            if wrap_inline && is_inline {
                let wrapper = match paragraph {
                    Some(wrapper) => wrapper,
                    None => {
                        let wrapper = self.create_node(ParagraphNode::new())?;
                        self.append(parent, wrapper)?;
                        inserted.push(wrapper);
                        paragraph = Some(wrapper);
                        wrapper
                    }
                };
                self.append(wrapper, key)?;
            } else {
                paragraph = None;
                self.append(parent, key)?;
                inserted.push(key);
            }
        }
        Ok(inserted)
    }

    fn build_imported(&mut self, imported: ImportedNode) -> Result<NodeKey, EditorError> {
        let key = self.create_node(imported.payload)?;
        for child in imported.children {
            let child_key = self.build_imported(child)?;
            self.append(key, child_key)?;
        }
        Ok(key)
    }

    /// Freeze the drafts into a new snapshot. `None` when nothing was touched.
    pub(crate) fn commit(self) -> Option<(EditorState, HashSet<NodeKey>)> {
        if self.drafts.is_empty() {
            return None;
        }

        let mut nodes = self.base.nodes().clone();
        let mut dirty = HashSet::with_capacity(self.drafts.len());
        for (key, mut draft) in self.drafts {
            draft.freeze();
            nodes.insert(key, Arc::new(*draft));
            dirty.insert(key);
        }

        let mut reachable = HashSet::with_capacity(nodes.len());
        let mut stack = vec![NodeKey::ROOT];
        while let Some(key) = stack.pop() {
            if reachable.insert(key) {
                if let Some(node) = nodes.get(&key) {
                    stack.extend(node.children().iter().copied());
                }
            }
        }
        let before = nodes.len();
        nodes.retain(|key, _| reachable.contains(key));
        dirty.retain(|key| reachable.contains(key));

        debug!(
            drafts = dirty.len(),
            collected = before - nodes.len(),
            "Transaction committed"
        );
        Some((EditorState::from_nodes(nodes), dirty))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::{BudgetLinkNode, PollNode};

    fn with_txn<T>(f: impl FnOnce(&mut Transaction<'_>) -> T) -> T {
        let registry = NodeRegistry::with_defaults();
        let state = EditorState::empty();
        let mut txn = Transaction::new(&registry, &state);
        f(&mut txn)
    }

    #[test]
    fn test_append_moves_between_parents() {
        with_txn(|txn| {
            let a = txn.create_node(ParagraphNode::new()).unwrap();
            let b = txn.create_node(ParagraphNode::new()).unwrap();
            let text = txn.create_node(TextNode::new("x")).unwrap();
            txn.append(NodeKey::ROOT, a).unwrap();
            txn.append(NodeKey::ROOT, b).unwrap();
            txn.append(a, text).unwrap();
            txn.append(b, text).unwrap();

            assert!(txn.children(a).is_empty());
            assert_eq!(txn.children(b), vec![text]);
            assert_eq!(txn.node(text).unwrap().parent(), Some(b));
        });
    }

    #[test]
    fn test_insert_at_same_parent_reorders() {
        with_txn(|txn| {
            let keys: Vec<_> = (0..3)
                .map(|_| {
                    let k = txn.create_node(ParagraphNode::new()).unwrap();
                    txn.append(NodeKey::ROOT, k).unwrap();
                    k
                })
                .collect();
            txn.insert_at(NodeKey::ROOT, 3, keys[0]).unwrap();
            assert_eq!(txn.children(NodeKey::ROOT), vec![keys[1], keys[2], keys[0]]);
            txn.insert_at(NodeKey::ROOT, 0, keys[0]).unwrap();
            assert_eq!(txn.children(NodeKey::ROOT), keys);
        });
    }

    #[test]
    fn test_structural_errors() {
        with_txn(|txn| {
            let outer = txn.create_node(ParagraphNode::new()).unwrap();
            let link = txn.create_node(BudgetLinkNode::new("https://x", "USD", 1.0, "")).unwrap();
            let poll = txn.create_node(PollNode::new("Q")).unwrap();
            txn.append(NodeKey::ROOT, outer).unwrap();
            txn.append(outer, link).unwrap();

            assert_eq!(
                txn.append(link, outer).unwrap_err().as_mutation(),
                Some(&MutationError::CycleDetected)
            );
            assert_eq!(
                txn.append(poll, link).unwrap_err().as_mutation(),
                Some(&MutationError::NotAnElement(poll))
            );
            assert_eq!(
                txn.append(outer, NodeKey::ROOT).unwrap_err().as_mutation(),
                Some(&MutationError::RootImmutable)
            );
            assert_eq!(
                txn.remove(NodeKey::ROOT).unwrap_err().as_mutation(),
                Some(&MutationError::RootImmutable)
            );
        });
    }

    #[test]
    fn test_removed_nodes_stay_removed() {
        with_txn(|txn| {
            let paragraph = txn.create_node(ParagraphNode::new()).unwrap();
            let text = txn.create_node(TextNode::new("gone")).unwrap();
            txn.append(NodeKey::ROOT, paragraph).unwrap();
            txn.append(paragraph, text).unwrap();
            txn.remove(paragraph).unwrap();

            assert_eq!(txn.node(text).unwrap().state(), NodeState::Removed);
            assert_eq!(
                txn.append(NodeKey::ROOT, paragraph).unwrap_err().as_mutation(),
                Some(&MutationError::DetachedMutation(paragraph))
            );
            assert_eq!(
                txn.writable::<TextNode>(text).unwrap_err().as_mutation(),
                Some(&MutationError::DetachedMutation(text))
            );
        });
    }

    #[test]
    fn test_replace_keeps_position() {
        with_txn(|txn| {
            let first = txn.create_node(ParagraphNode::new()).unwrap();
            let second = txn.create_node(ParagraphNode::new()).unwrap();
            txn.append(NodeKey::ROOT, first).unwrap();
            txn.append(NodeKey::ROOT, second).unwrap();

            let poll = txn.replace(first, PollNode::new("Q"), false).unwrap();
            assert_eq!(txn.children(NodeKey::ROOT), vec![poll, second]);
            assert_eq!(txn.node(first).unwrap().state(), NodeState::Removed);
        });
    }

    #[test]
    fn test_duplicate_subtree() {
        with_txn(|txn| {
            let link = txn.create_text_link("https://www.agoda.com/en-gb/villa-ubud/hotel/bali.html").unwrap();
            let copy = txn.duplicate(link).unwrap();

            assert_ne!(copy, link);
            assert_eq!(txn.node(copy).unwrap().parent(), None);
            assert_eq!(txn.text_content(copy), "Villa Ubud");
            assert_ne!(txn.children(copy), txn.children(link));
        });
    }

    #[test]
    fn test_unregistered_type_rejected() {
        let mut registry = NodeRegistry::new();
        registry.register_type::<crate::nodes::RootNode>().unwrap();
        let state = EditorState::empty();
        let mut txn = Transaction::new(&registry, &state);
        assert!(matches!(
            txn.create_node(PollNode::new("Q")),
            Err(EditorError::Registry(RegistryError::UnknownType(_)))
        ));
    }

    #[test]
    fn test_commit_collects_unreachable() {
        let registry = NodeRegistry::with_defaults();
        let state = EditorState::empty();
        let mut txn = Transaction::new(&registry, &state);
        let kept = txn.create_node(ParagraphNode::new()).unwrap();
        let orphan = txn.create_node(ParagraphNode::new()).unwrap();
        txn.append(NodeKey::ROOT, kept).unwrap();

        let (next, dirty) = txn.commit().unwrap();
        assert!(next.node(kept).unwrap().is_frozen());
        assert!(next.node(orphan).is_none());
        assert!(dirty.contains(&kept));
        assert!(!dirty.contains(&orphan));
    }
}
