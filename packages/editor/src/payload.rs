//! Closed set of node payloads
//!
//! Structural data (key, parent, children) lives on [`crate::Node`]; the
//! payload carries the type-specific fields and dispatches the capability
//! traits to the concrete type.

use crate::node_type::{DomConvertible, NodeKind, NodeType, Serializable};
use crate::nodes::{
    BudgetLinkNode, LinkNode, ParagraphNode, PollNode, RootNode, TextLinkNode, TextNode,
    TimelineItemNode, TravelBudgetNode, UnknownNode,
};
use playground_dom::DomNode;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum NodePayload {
    Root(RootNode),
    Paragraph(ParagraphNode),
    Text(TextNode),
    Link(LinkNode),
    BudgetLink(BudgetLinkNode),
    TextLink(TextLinkNode),
    TravelBudget(TravelBudgetNode),
    Poll(PollNode),
    TimelineItem(TimelineItemNode),
    /// Fallback for a node that could not be decoded
    Unknown(UnknownNode),
}

impl NodePayload {
    pub fn type_tag(&self) -> &str {
        match self {
            NodePayload::Root(_) => RootNode::TYPE,
            NodePayload::Paragraph(_) => ParagraphNode::TYPE,
            NodePayload::Text(_) => TextNode::TYPE,
            NodePayload::Link(_) => LinkNode::TYPE,
            NodePayload::BudgetLink(_) => BudgetLinkNode::TYPE,
            NodePayload::TextLink(_) => TextLinkNode::TYPE,
            NodePayload::TravelBudget(_) => TravelBudgetNode::TYPE,
            NodePayload::Poll(_) => PollNode::TYPE,
            NodePayload::TimelineItem(_) => TimelineItemNode::TYPE,
            NodePayload::Unknown(node) => node.original_type(),
        }
    }

    pub fn version(&self) -> u64 {
        match self {
            NodePayload::Root(_) => RootNode::VERSION,
            NodePayload::Paragraph(_) => ParagraphNode::VERSION,
            NodePayload::Text(_) => TextNode::VERSION,
            NodePayload::Link(_) => LinkNode::VERSION,
            NodePayload::BudgetLink(_) => BudgetLinkNode::VERSION,
            NodePayload::TextLink(_) => TextLinkNode::VERSION,
            NodePayload::TravelBudget(_) => TravelBudgetNode::VERSION,
            NodePayload::Poll(_) => PollNode::VERSION,
            NodePayload::TimelineItem(_) => TimelineItemNode::VERSION,
            NodePayload::Unknown(node) => node.original_version(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            NodePayload::Root(_) => RootNode::KIND,
            NodePayload::Paragraph(_) => ParagraphNode::KIND,
            NodePayload::Text(_) => TextNode::KIND,
            NodePayload::Link(_) => LinkNode::KIND,
            NodePayload::BudgetLink(_) => BudgetLinkNode::KIND,
            NodePayload::TextLink(_) => TextLinkNode::KIND,
            NodePayload::TravelBudget(_) => TravelBudgetNode::KIND,
            NodePayload::Poll(_) => PollNode::KIND,
            NodePayload::TimelineItem(_) => TimelineItemNode::KIND,
            NodePayload::Unknown(_) => NodeKind::Decorator,
        }
    }

    /// Type-specific JSON fields. An unknown node returns its raw object.
    pub fn export_json(&self) -> Map<String, Value> {
        match self {
            NodePayload::Root(node) => node.export_json(),
            NodePayload::Paragraph(node) => node.export_json(),
            NodePayload::Text(node) => node.export_json(),
            NodePayload::Link(node) => node.export_json(),
            NodePayload::BudgetLink(node) => node.export_json(),
            NodePayload::TextLink(node) => node.export_json(),
            NodePayload::TravelBudget(node) => node.export_json(),
            NodePayload::Poll(node) => node.export_json(),
            NodePayload::TimelineItem(node) => node.export_json(),
            NodePayload::Unknown(node) => node.raw().clone(),
        }
    }

    /// Markup for this node alone; `None` for nodes without a markup form
    pub fn export_dom(&self) -> Option<DomNode> {
        match self {
            NodePayload::Root(_) | NodePayload::Unknown(_) => None,
            NodePayload::Paragraph(node) => Some(node.export_dom()),
            NodePayload::Text(node) => Some(node.export_dom()),
            NodePayload::Link(node) => Some(node.export_dom()),
            NodePayload::BudgetLink(node) => Some(node.export_dom()),
            NodePayload::TextLink(node) => Some(node.export_dom()),
            NodePayload::TravelBudget(node) => Some(node.export_dom()),
            NodePayload::Poll(node) => Some(node.export_dom()),
            NodePayload::TimelineItem(node) => Some(node.export_dom()),
        }
    }

    /// Inline nodes must sit inside a block element
    pub fn is_inline(&self) -> bool {
        matches!(
            self,
            NodePayload::Text(_)
                | NodePayload::Link(_)
                | NodePayload::BudgetLink(_)
                | NodePayload::TextLink(_)
        )
    }

    /// Plain text carried by the node itself, excluding children
    pub fn own_text(&self) -> Option<String> {
        match self {
            NodePayload::Text(node) => Some(node.text.clone()),
            NodePayload::TimelineItem(node) => Some(node.text_content()),
            _ => None,
        }
    }

    pub fn is<T: NodeType>(&self) -> bool {
        T::downcast(self).is_some()
    }
}
