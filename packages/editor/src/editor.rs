//! # Editor
//!
//! Owns the committed [`EditorState`] of one document and runs the
//! read/update cycle over it. The editor is single-threaded: one update may
//! be open at a time, and reads always observe the last committed state.

use crate::commands::{
    register_default_commands, run_handlers, CommandBus, CommandHandle, CommandHandler,
    CommandKind, CommandPriority, EditorCommand,
};
use crate::config::EditorConfig;
use crate::errors::{EditorError, MutationError};
use crate::key::NodeKey;
use crate::registry::NodeRegistry;
use crate::state::{EditorState, ImportReport};
use crate::transaction::Transaction;
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, warn};

/// Called after every commit with the previous state, the new state and the
/// keys of the nodes written by the update
pub type UpdateListener = Rc<dyn Fn(&EditorState, &EditorState, &HashSet<NodeKey>)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle(u64);

pub struct Editor {
    config: EditorConfig,
    registry: NodeRegistry,
    state: RefCell<Arc<EditorState>>,
    updating: Cell<bool>,
    listeners: RefCell<Vec<(ListenerHandle, UpdateListener)>>,
    next_listener: Cell<u64>,
    commands: RefCell<CommandBus>,
}

/// Clears the update flag however the update ends
struct UpdateGuard<'a>(&'a Cell<bool>);

impl Drop for UpdateGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl Editor {
    pub fn new(config: EditorConfig) -> Result<Self, EditorError> {
        let registry = config.build_registry()?;
        Ok(Self::with_registry(config, registry))
    }

    pub fn with_registry(config: EditorConfig, registry: NodeRegistry) -> Self {
        let mut commands = CommandBus::new();
        register_default_commands(&mut commands);
        debug!(
            source = %config.source,
            node_types = registry.len(),
            "Editor created"
        );

        Self {
            config,
            registry,
            state: RefCell::new(Arc::new(EditorState::empty())),
            updating: Cell::new(false),
            listeners: RefCell::new(Vec::new()),
            next_listener: Cell::new(0),
            commands: RefCell::new(commands),
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    /// The last committed state
    pub fn state(&self) -> Arc<EditorState> {
        self.state.borrow().clone()
    }

    pub fn is_updating(&self) -> bool {
        self.updating.get()
    }

    /// Run `f` against the committed state. Drafts of an open update are never visible.
    pub fn read<T>(&self, f: impl FnOnce(&EditorState) -> T) -> T {
        let state = self.state();
        f(&state)
    }

    /// Run `f` in a transaction and commit its drafts.
    ///
    /// An error from `f` discards every draft. Calling `update` while another
    /// update is open fails with [`MutationError::ReentrantUpdate`].
    pub fn update<T>(
        &self,
        f: impl FnOnce(&mut Transaction<'_>) -> Result<T, EditorError>,
    ) -> Result<T, EditorError> {
        if self.updating.get() {
            return Err(MutationError::ReentrantUpdate.into());
        }
        self.updating.set(true);
        let guard = UpdateGuard(&self.updating);

        let base = self.state();
        let mut txn = Transaction::new(&self.registry, &base);
        let value = match f(&mut txn) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, drafts = txn.draft_count(), "Update failed, drafts discarded");
                return Err(e);
            }
        };

        let Some((next, dirty)) = txn.commit() else {
            return Ok(value);
        };
        let next = Arc::new(next);
        *self.state.borrow_mut() = next.clone();
        drop(guard);

        self.notify(&base, &next, &dirty);
        Ok(value)
    }

    /// Replace the whole document, e.g. after loading it
    pub fn set_state(&self, state: EditorState) -> Result<(), EditorError> {
        if self.updating.get() {
            return Err(MutationError::ReentrantUpdate.into());
        }
        let previous = self.state();
        let next = Arc::new(state);
        *self.state.borrow_mut() = next.clone();

        let dirty = next.keys_in_order().into_iter().collect();
        self.notify(&previous, &next, &dirty);
        Ok(())
    }

    /// Parse `{"root": ...}` with this editor's registry and make it the current state
    pub fn load_state_json(&self, value: &Value) -> Result<ImportReport, EditorError> {
        let (state, report) = EditorState::from_json(value, &self.registry)?;
        self.set_state(state)?;
        Ok(report)
    }

    pub fn register_update_listener(
        &self,
        listener: impl Fn(&EditorState, &EditorState, &HashSet<NodeKey>) + 'static,
    ) -> ListenerHandle {
        let handle = ListenerHandle(self.next_listener.get());
        self.next_listener.set(handle.0 + 1);
        self.listeners.borrow_mut().push((handle, Rc::new(listener)));
        handle
    }

    pub fn unregister_update_listener(&self, handle: ListenerHandle) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(h, _)| *h != handle);
        listeners.len() != before
    }

    fn notify(&self, previous: &EditorState, next: &EditorState, dirty: &HashSet<NodeKey>) {
        // Snapshot so listeners may register or unregister listeners
        let listeners: Vec<UpdateListener> =
            self.listeners.borrow().iter().map(|(_, l)| l.clone()).collect();
        for listener in listeners {
            listener(previous, next, dirty);
        }
    }

    pub fn register_command(
        &self,
        kind: CommandKind,
        priority: CommandPriority,
        handler: impl Fn(&EditorCommand, &mut Transaction<'_>) -> Result<bool, EditorError> + 'static,
    ) -> CommandHandle {
        let handler: CommandHandler = Rc::new(handler);
        self.commands.borrow_mut().register(kind, priority, handler)
    }

    pub fn unregister_command(&self, handle: CommandHandle) -> bool {
        self.commands.borrow_mut().unregister(handle)
    }

    /// Dispatch a command inside one update. Returns whether a handler took it.
    pub fn dispatch_command(&self, command: EditorCommand) -> Result<bool, EditorError> {
        let handlers = self.commands.borrow().handlers_for(command.kind());
        let handled = self.update(|txn| run_handlers(&handlers, &command, txn))?;
        debug!(kind = ?command.kind(), handled, "Command dispatched");
        Ok(handled)
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::with_registry(EditorConfig::default(), NodeRegistry::with_defaults())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::{BudgetLinkNode, ParagraphNode, PollNode};

    fn editor_with_link() -> (Editor, NodeKey) {
        let editor = Editor::default();
        let key = editor
            .update(|txn| {
                let paragraph = txn.create_node(ParagraphNode::new())?;
                let link = txn.create_node(BudgetLinkNode::new("https://x", "USD", 120.0, "Transportation"))?;
                txn.append(NodeKey::ROOT, paragraph)?;
                txn.append(paragraph, link)?;
                Ok(link)
            })
            .unwrap();
        (editor, key)
    }

    #[test]
    fn test_update_commits() {
        let (editor, key) = editor_with_link();
        let state = editor.state();
        assert_eq!(state.get::<BudgetLinkNode>(key).unwrap().amount(), 120.0);
        assert!(state.node(key).unwrap().is_frozen());
    }

    #[test]
    fn test_failed_update_discards_drafts() {
        let (editor, key) = editor_with_link();
        let before = editor.state();

        let result: Result<(), _> = editor.update(|txn| {
            txn.writable::<BudgetLinkNode>(key)?.set_amount(1.0);
            txn.remove(NodeKey::ROOT)
        });

        assert!(result.is_err());
        assert!(Arc::ptr_eq(&before, &editor.state()));
        assert!(!editor.is_updating());
    }

    #[test]
    fn test_nested_update_rejected() {
        let editor = Editor::default();
        let result = editor.update(|_| editor.update(|_| Ok(())));
        assert_eq!(
            result.unwrap_err().as_mutation(),
            Some(&MutationError::ReentrantUpdate)
        );
        assert!(editor.update(|_| Ok(())).is_ok());
    }

    #[test]
    fn test_listeners() {
        let editor = Editor::default();
        let calls = Rc::new(RefCell::new(Vec::new()));
        let seen = calls.clone();
        let handle = editor.register_update_listener(move |_, next, dirty| {
            seen.borrow_mut().push((next.len(), dirty.len()));
        });

        editor
            .dispatch_command(EditorCommand::InsertPoll {
                question: "Q".to_string(),
            })
            .unwrap();
        // Untouched state, no notification
        editor.update(|_| Ok(())).unwrap();
        assert_eq!(*calls.borrow(), vec![(2, 2)]);

        assert!(editor.unregister_update_listener(handle));
        editor
            .dispatch_command(EditorCommand::InsertPoll {
                question: "R".to_string(),
            })
            .unwrap();
        assert_eq!(calls.borrow().len(), 1);
    }

    #[test]
    fn test_dispatch_default_handlers() {
        let editor = Editor::default();
        assert!(editor
            .dispatch_command(EditorCommand::InsertPoll {
                question: "Where next?".to_string()
            })
            .unwrap());
        assert!(!editor
            .dispatch_command(EditorCommand::PasteText("just words".to_string()))
            .unwrap());
        assert!(editor
            .dispatch_command(EditorCommand::PasteText(
                " https://www.klook.com/activity/77-mount-batur-sunrise/ ".to_string()
            ))
            .unwrap());

        let state = editor.state();
        assert_eq!(state.nodes_of_type::<PollNode>().len(), 1);
        assert_eq!(
            state.text_content(),
            "\n\nMount Batur Sunrise"
        );
    }
}
