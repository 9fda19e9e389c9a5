//! Markdown export

use crate::codec::format_amount;
use crate::key::NodeKey;
use crate::nodes::{TextFormat, TextNode, TravelBudgetNode};
use crate::payload::NodePayload;
use crate::state::EditorState;

/// Render the document as Markdown, one block per top-level node
pub fn to_markdown(state: &EditorState) -> String {
    state
        .root()
        .children()
        .iter()
        .filter_map(|key| block(state, *key))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn block(state: &EditorState, key: NodeKey) -> Option<String> {
    let node = state.node(key)?;
    match node.payload() {
        NodePayload::Poll(poll) => {
            let mut out = format!("**{}**", poll.question());
            for option in poll.options() {
                out.push_str("\n- [ ] ");
                out.push_str(&option.text);
            }
            Some(out)
        }
        NodePayload::TimelineItem(item) => Some(item.text_content()),
        NodePayload::TravelBudget(budget) => Some(travel_budget_line(budget)),
        NodePayload::Unknown(_) | NodePayload::Root(_) => None,
        _ => Some(inline(state, key)),
    }
}

fn travel_budget_line(budget: &TravelBudgetNode) -> String {
    let option = budget.option();
    let mut parts = Vec::new();
    if !option.title.is_empty() {
        parts.push(format!("**{}**", option.title));
    }
    if !option.time.is_empty() {
        parts.push(option.time.clone());
    }
    parts.push(format!("{} {}", option.currency, format_amount(option.amt)));
    parts.push(option.category.clone());
    parts.join(" | ")
}

fn inline(state: &EditorState, key: NodeKey) -> String {
    let Some(node) = state.node(key) else {
        return String::new();
    };
    let children = || -> String {
        node.children()
            .iter()
            .map(|child| inline(state, *child))
            .collect()
    };

    match node.payload() {
        NodePayload::Text(text) => formatted(text),
        NodePayload::Link(link) => link_markdown(&children(), link.url()),
        NodePayload::BudgetLink(link) => link_markdown(&children(), link.url()),
        NodePayload::TextLink(link) => link_markdown(&children(), link.url()),
        NodePayload::TimelineItem(item) => item.text_content(),
        _ => children(),
    }
}

fn link_markdown(label: &str, url: &str) -> String {
    let label = if label.is_empty() { url } else { label };
    format!("[{}]({})", label, url)
}

fn formatted(text: &TextNode) -> String {
    if text.text.is_empty() {
        return String::new();
    }
    let format = text.format;
    if format.contains(TextFormat::CODE) {
        return format!("`{}`", text.text);
    }

    let mut out = text.text.clone();
    for (flag, marker) in [
        (TextFormat::STRIKETHROUGH, "~~"),
        (TextFormat::ITALIC, "*"),
        (TextFormat::BOLD, "**"),
    ] {
        if format.contains(flag) {
            out = format!("{marker}{out}{marker}");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::{ParagraphNode, PollNode, TextLinkNode};
    use crate::registry::NodeRegistry;
    use crate::transaction::Transaction;

    #[test]
    fn test_paragraphs_links_and_polls() {
        let registry = NodeRegistry::with_defaults();
        let base = EditorState::empty();
        let mut txn = Transaction::new(&registry, &base);

        let paragraph = txn.create_node(ParagraphNode::new()).unwrap();
        let bold = txn
            .create_node(TextNode::new("Stay").with_format(TextFormat::BOLD))
            .unwrap();
        let link = txn.create_node(TextLinkNode::new("https://x.org")).unwrap();
        txn.append(NodeKey::ROOT, paragraph).unwrap();
        txn.append(paragraph, bold).unwrap();
        txn.append(paragraph, link).unwrap();

        let poll = txn.create_node(PollNode::new("Dinner?")).unwrap();
        txn.append(NodeKey::ROOT, poll).unwrap();
        let uid = txn.get::<PollNode>(poll).unwrap().options()[0].uid.clone();
        txn.writable::<PollNode>(poll).unwrap().set_option_text(&uid, "Warung");

        let (state, _) = txn.commit().unwrap();
        assert_eq!(
            to_markdown(&state),
            "**Stay**[https://x.org](https://x.org)\n\n**Dinner?**\n- [ ] Warung\n- [ ] "
        );
    }

    #[test]
    fn test_text_formats() {
        let text = TextNode::new("t");
        assert_eq!(formatted(&text.clone().with_format(TextFormat::CODE.with(TextFormat::BOLD))), "`t`");
        assert_eq!(
            formatted(&text.with_format(TextFormat::BOLD.with(TextFormat::ITALIC))),
            "***t***"
        );
    }
}
