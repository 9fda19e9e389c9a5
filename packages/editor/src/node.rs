//! # Node Instances
//!
//! A [`Node`] pairs the structural record shared by every type (key, parent,
//! ordered children, lifecycle state) with a [`NodePayload`].
//!
//! Committed nodes are frozen. Mutation happens on a draft obtained from
//! [`crate::Transaction::get_writable`], which clones the committed node in
//! place (same key) and thaws the copy. Type-specific setters are reached
//! only through [`Node::payload_mut`], which refuses frozen and removed nodes.

use crate::errors::MutationError;
use crate::key::NodeKey;
use crate::node_type::{NodeKind, NodeType};
use crate::payload::NodePayload;

/// Lifecycle position of a node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NodeState {
    /// Constructed, not yet inserted under a parent
    #[default]
    Unattached,
    Attached,
    /// Detached from the tree; terminal
    Removed,
}

#[derive(Debug, PartialEq)]
pub struct Node {
    key: NodeKey,
    parent: Option<NodeKey>,
    children: Vec<NodeKey>,
    state: NodeState,
    frozen: bool,
    payload: NodePayload,
}

impl Node {
    pub(crate) fn new(key: NodeKey, payload: NodePayload) -> Self {
        Self {
            key,
            parent: None,
            children: Vec::new(),
            state: NodeState::Unattached,
            frozen: false,
            payload,
        }
    }

    pub fn key(&self) -> NodeKey {
        self.key
    }

    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    pub fn children(&self) -> &[NodeKey] {
        &self.children
    }

    pub fn state(&self) -> NodeState {
        self.state
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn payload(&self) -> &NodePayload {
        &self.payload
    }

    pub fn kind(&self) -> NodeKind {
        self.payload.kind()
    }

    pub fn type_tag(&self) -> &str {
        self.payload.type_tag()
    }

    /// Typed view of the payload
    pub fn get<T: NodeType>(&self) -> Option<&T> {
        T::downcast(&self.payload)
    }

    /// Exact copy, key and frozen flag included (copy-on-write path)
    pub fn clone_in_place(&self) -> Node {
        Node {
            key: self.key,
            parent: self.parent,
            children: self.children.clone(),
            state: self.state,
            frozen: self.frozen,
            payload: self.payload.clone(),
        }
    }

    /// Structurally distinct copy: fresh key, unattached, no children
    pub fn duplicate(&self) -> Node {
        Node::new(NodeKey::next(), self.payload.clone())
    }

    /// Writable typed payload; fails on frozen or removed nodes
    pub fn payload_mut<T: NodeType>(&mut self) -> Result<&mut T, MutationError> {
        let key = self.key;
        let found = self.payload.type_tag().to_string();
        T::downcast_mut(self.payload_writable()?).ok_or(MutationError::WrongType {
            key,
            expected: T::TYPE,
            found,
        })
    }

    pub(crate) fn payload_writable(&mut self) -> Result<&mut NodePayload, MutationError> {
        self.check_writable()?;
        Ok(&mut self.payload)
    }

    pub(crate) fn check_writable(&self) -> Result<(), MutationError> {
        if self.frozen {
            return Err(MutationError::NotInUpdate);
        }
        if self.state == NodeState::Removed {
            return Err(MutationError::DetachedMutation(self.key));
        }
        Ok(())
    }

    pub(crate) fn freeze(&mut self) {
        self.frozen = true;
    }

    pub(crate) fn thaw(&mut self) {
        self.frozen = false;
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeKey>) {
        self.parent = parent;
    }

    pub(crate) fn set_state(&mut self, state: NodeState) {
        self.state = state;
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<NodeKey> {
        &mut self.children
    }
}
