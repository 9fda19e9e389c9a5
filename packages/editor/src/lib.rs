//! # Playground Editor
//!
//! Document model of a rich-text travel-planning editor: a tree of typed
//! nodes, snapshots that are cheap to share, and an update cycle that
//! copies a node only when it is written.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ registry: type tag → descriptor             │
//! │  - JSON import + version migration          │
//! │  - DOM conversions by priority              │
//! │  - type replacement (legacy budget links)   │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: committed EditorState               │
//! │  - update() → Transaction (drafts per key)  │
//! │  - commit swaps snapshots, notifies         │
//! │  - command bus for plugin insertions        │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ export: JSON document, HTML, Markdown       │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use playground_editor::{Editor, NodeKey};
//! use playground_editor::nodes::{BudgetLinkNode, ParagraphNode, TextNode};
//!
//! let editor = Editor::default();
//! editor.update(|txn| {
//!     let paragraph = txn.create_node(ParagraphNode::new())?;
//!     let link = txn.create_node(BudgetLinkNode::new("https://x", "USD", 120.0, "Transportation"))?;
//!     let label = txn.create_node(TextNode::new("Ferry"))?;
//!     txn.append(link, label)?;
//!     txn.append(paragraph, link)?;
//!     txn.append(NodeKey::ROOT, paragraph)
//! })?;
//!
//! let document = editor.export_document();
//! document.write("trip.json")?;
//! ```

mod codec;
mod commands;
mod config;
mod document;
mod editor;
mod errors;
mod html;
mod key;
mod markdown;
mod node;
mod node_type;
pub mod nodes;
mod payload;
mod registry;
mod state;
mod transaction;

pub use codec::{format_amount, JsonFields};
pub use commands::{
    register_default_commands, CommandBus, CommandHandle, CommandHandler, CommandKind,
    CommandPriority, EditorCommand,
};
pub use config::{EditorConfig, DEFAULT_CONFIG_NAME};
pub use document::DocumentJson;
pub use editor::{Editor, ListenerHandle, UpdateListener};
pub use errors::{CodecError, EditorError, MutationError, RegistryError};
pub use html::{generate_html, generate_html_string, import_dom_nodes, ImportedNode};
pub use key::NodeKey;
pub use markdown::to_markdown;
pub use node::{Node, NodeState};
pub use node_type::{
    DomConversion, DomConvertFn, DomConvertible, ImportContext, NodeKind, NodeType, Serializable,
};
pub use payload::NodePayload;
pub use registry::{
    builtin_descriptors, upgrade_legacy_budget_link, NodeDescriptor, NodeRegistry, ReplacementFn,
};
pub use state::{EditorState, ImportReport, RecoveredNode};
pub use transaction::Transaction;

// Re-export the markup types used by DOM import and export
pub use playground_dom::{DomElement, DomNode, RenderOptions};
