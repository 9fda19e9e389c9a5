//! # Command Bus
//!
//! Plugins ask for document changes by dispatching an [`EditorCommand`].
//! Handlers are registered per command kind with a priority and run inside
//! the dispatching update, highest priority first, until one reports the
//! command handled. Equal priorities run in registration order.

use crate::errors::EditorError;
use crate::key::NodeKey;
use crate::node_type::NodeType;
use crate::nodes::{
    BudgetLinkNode, ParagraphNode, PollNode, TextLinkNode, TextNode, TimelineItemNode,
    TravelBudgetNode, TravelBudgetOption,
};
use crate::transaction::Transaction;
use std::rc::Rc;
use url::Url;

#[derive(Debug, Clone, PartialEq)]
pub enum EditorCommand {
    InsertBudgetLink {
        url: String,
        currency: String,
        amount: f64,
        category: String,
        /// Link text; the URL when absent
        text: Option<String>,
    },
    InsertTravelBudget(TravelBudgetOption),
    InsertPoll {
        question: String,
    },
    InsertTextLink {
        url: String,
    },
    InsertTimelineItem(TimelineItemNode),
    PasteText(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    InsertBudgetLink,
    InsertTravelBudget,
    InsertPoll,
    InsertTextLink,
    InsertTimelineItem,
    PasteText,
}

impl EditorCommand {
    pub fn kind(&self) -> CommandKind {
        match self {
            EditorCommand::InsertBudgetLink { .. } => CommandKind::InsertBudgetLink,
            EditorCommand::InsertTravelBudget(_) => CommandKind::InsertTravelBudget,
            EditorCommand::InsertPoll { .. } => CommandKind::InsertPoll,
            EditorCommand::InsertTextLink { .. } => CommandKind::InsertTextLink,
            EditorCommand::InsertTimelineItem(_) => CommandKind::InsertTimelineItem,
            EditorCommand::PasteText(_) => CommandKind::PasteText,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CommandPriority {
    Editor,
    Low,
    Normal,
    High,
    Critical,
}

/// Returns `Ok(true)` when the command was handled
pub type CommandHandler = Rc<dyn Fn(&EditorCommand, &mut Transaction<'_>) -> Result<bool, EditorError>>;

/// Registration handle, used to unregister
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandHandle(u64);

struct Registered {
    handle: CommandHandle,
    kind: CommandKind,
    priority: CommandPriority,
    handler: CommandHandler,
}

#[derive(Default)]
pub struct CommandBus {
    handlers: Vec<Registered>,
    next_handle: u64,
}

impl CommandBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        kind: CommandKind,
        priority: CommandPriority,
        handler: CommandHandler,
    ) -> CommandHandle {
        let handle = CommandHandle(self.next_handle);
        self.next_handle += 1;
        self.handlers.push(Registered {
            handle,
            kind,
            priority,
            handler,
        });
        handle
    }

    pub fn unregister(&mut self, handle: CommandHandle) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|r| r.handle != handle);
        self.handlers.len() != before
    }

    /// Handlers for a kind in dispatch order
    pub fn handlers_for(&self, kind: CommandKind) -> Vec<CommandHandler> {
        let mut matching: Vec<&Registered> = self.handlers.iter().filter(|r| r.kind == kind).collect();
        matching.sort_by(|a, b| b.priority.cmp(&a.priority));
        matching.into_iter().map(|r| r.handler.clone()).collect()
    }
}

/// Run handlers in order until one handles the command
pub(crate) fn run_handlers(
    handlers: &[CommandHandler],
    command: &EditorCommand,
    txn: &mut Transaction<'_>,
) -> Result<bool, EditorError> {
    for handler in handlers {
        if handler(command, txn)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Insert handlers for the built-in node types at `Editor` priority
pub fn register_default_commands(bus: &mut CommandBus) {
    bus.register(
        CommandKind::InsertBudgetLink,
        CommandPriority::Editor,
        Rc::new(insert_budget_link),
    );
    bus.register(
        CommandKind::InsertTravelBudget,
        CommandPriority::Editor,
        Rc::new(insert_travel_budget),
    );
    bus.register(CommandKind::InsertPoll, CommandPriority::Editor, Rc::new(insert_poll));
    bus.register(
        CommandKind::InsertTextLink,
        CommandPriority::Editor,
        Rc::new(insert_text_link),
    );
    bus.register(
        CommandKind::InsertTimelineItem,
        CommandPriority::Editor,
        Rc::new(insert_timeline_item),
    );
    bus.register(CommandKind::PasteText, CommandPriority::Editor, Rc::new(paste_text));
}

/// Wrap an inline node in a new paragraph at the end of the document
fn append_in_paragraph(txn: &mut Transaction<'_>, inline: NodeKey) -> Result<(), EditorError> {
    let paragraph = txn.create_node(ParagraphNode::new())?;
    txn.append(paragraph, inline)?;
    txn.append(NodeKey::ROOT, paragraph)
}

fn insert_budget_link(command: &EditorCommand, txn: &mut Transaction<'_>) -> Result<bool, EditorError> {
    let EditorCommand::InsertBudgetLink {
        url,
        currency,
        amount,
        category,
        text,
    } = command
    else {
        return Ok(false);
    };
    if !txn.registry().contains(BudgetLinkNode::TYPE) {
        return Ok(false);
    }

    let link = txn.create_node(BudgetLinkNode::new(url.as_str(), currency.as_str(), *amount, category.as_str()))?;
    let label = txn.create_node(TextNode::new(text.clone().unwrap_or_else(|| url.clone())))?;
    txn.append(link, label)?;
    append_in_paragraph(txn, link)?;
    Ok(true)
}

fn insert_travel_budget(command: &EditorCommand, txn: &mut Transaction<'_>) -> Result<bool, EditorError> {
    let EditorCommand::InsertTravelBudget(option) = command else {
        return Ok(false);
    };
    if !txn.registry().contains(TravelBudgetNode::TYPE) {
        return Ok(false);
    }
    let mut node = TravelBudgetNode::default();
    node.set_option(option.clone());
    let key = txn.create_node(node)?;
    txn.append(NodeKey::ROOT, key)?;
    Ok(true)
}

fn insert_poll(command: &EditorCommand, txn: &mut Transaction<'_>) -> Result<bool, EditorError> {
    let EditorCommand::InsertPoll { question } = command else {
        return Ok(false);
    };
    if !txn.registry().contains(PollNode::TYPE) {
        return Ok(false);
    }
    let key = txn.create_node(PollNode::new(question.as_str()))?;
    txn.append(NodeKey::ROOT, key)?;
    Ok(true)
}

fn insert_text_link(command: &EditorCommand, txn: &mut Transaction<'_>) -> Result<bool, EditorError> {
    let EditorCommand::InsertTextLink { url } = command else {
        return Ok(false);
    };
    if !txn.registry().contains(TextLinkNode::TYPE) {
        return Ok(false);
    }
    let link = txn.create_text_link(url)?;
    append_in_paragraph(txn, link)?;
    Ok(true)
}

fn insert_timeline_item(command: &EditorCommand, txn: &mut Transaction<'_>) -> Result<bool, EditorError> {
    let EditorCommand::InsertTimelineItem(item) = command else {
        return Ok(false);
    };
    if !txn.registry().contains(TimelineItemNode::TYPE) {
        return Ok(false);
    }
    let key = txn.create_node(item.clone())?;
    txn.append(NodeKey::ROOT, key)?;
    Ok(true)
}

/// A pasted http(s) URL becomes a text link; anything else is left to other handlers
fn paste_text(command: &EditorCommand, txn: &mut Transaction<'_>) -> Result<bool, EditorError> {
    let EditorCommand::PasteText(text) = command else {
        return Ok(false);
    };
    let text = text.trim();
    let is_web_url = Url::parse(text)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false);
    if !is_web_url || !txn.registry().contains(TextLinkNode::TYPE) {
        return Ok(false);
    }
    let link = txn.create_text_link(text)?;
    append_in_paragraph(txn, link)?;
    Ok(true)
}
