//! Built-in node types

mod budget_link;
pub mod currency;
mod element;
mod link;
mod paragraph;
mod poll;
mod root;
mod text;
mod text_link;
mod timeline_item;
mod travel_budget;
mod unknown;

pub use budget_link::{parse_budget_rel, BudgetLinkNode, BUDGET_LINK_DATA_TYPE};
pub use element::ElementFormat;
pub use link::{LinkAttributes, LinkNode};
pub use paragraph::ParagraphNode;
pub use poll::{PollNode, PollOption, POLL_OPTIONS_ATTR, POLL_QUESTION_ATTR};
pub use root::RootNode;
pub use text::{TextFormat, TextMode, TextNode};
pub use text_link::{link_text_for, TextLinkNode, TEXT_LINK_DATA_TYPE};
pub use timeline_item::{TimelineColor, TimelineItemNode, TIMELINE_ITEM_MARKER};
pub use travel_budget::{TravelBudgetNode, TravelBudgetOption, TRAVEL_BUDGET_MARKER};
pub use unknown::UnknownNode;
