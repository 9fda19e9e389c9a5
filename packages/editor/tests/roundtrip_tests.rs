//! JSON and DOM round trips over generated documents

use playground_editor::nodes::{
    BudgetLinkNode, LinkNode, ParagraphNode, PollNode, PollOption, TextFormat, TextLinkNode,
    TextNode, TimelineColor, TimelineItemNode, TravelBudgetNode, TravelBudgetOption,
};
use playground_editor::{
    generate_html, DomElement, Editor, EditorError, EditorState, NodeDescriptor, NodeKey,
    NodePayload, NodeRegistry, Transaction,
};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Inline {
    Text { text: String, format: u32 },
    Link { url: String, rel: Option<String>, label: String },
    BudgetLink { url: String, currency: String, amount: f64, category: String, label: String },
    TextLink { url: String, label: String },
}

#[derive(Debug, Clone)]
enum Block {
    Paragraph(Vec<Inline>),
    Poll { question: String, options: Vec<PollOption> },
    Timeline(TimelineItemNode),
    TravelBudget { option: TravelBudgetOption, caption: Option<Vec<Inline>> },
}

/// Any text, including the empty string and markup characters
fn any_text() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        "[<>&\"' \n\t]{1,4}",
        "(?s).{1,12}",
    ]
}

/// Text node content; empty text nodes have no markup
fn label() -> impl Strategy<Value = String> {
    prop_oneof!["[<>&\"' \n\t]{1,4}", "(?s).{1,12}"]
}

fn url() -> impl Strategy<Value = String> {
    "[a-z]{3,10}".prop_map(|host| format!("https://{host}.example/trip"))
}

/// Finite amounts of any sign and size, plus non-finite input that is stored as 0
fn amount() -> impl Strategy<Value = f64> {
    prop_oneof![
        (-10_000_000i64..10_000_000).prop_map(|cents| cents as f64 / 100.0),
        -1e15f64..1e15,
        any::<f64>(),
    ]
}

fn arb_inline() -> impl Strategy<Value = Inline> {
    prop_oneof![
        (label(), 0u32..256).prop_map(|(text, format)| Inline::Text { text, format }),
        // Comma-free rels never look like the legacy budget encoding
        (url(), prop::option::of("(nofollow|noopener|external)"), label())
            .prop_map(|(url, rel, label)| Inline::Link { url, rel, label }),
        (url(), "[A-Z]{3}", amount(), "(Accommodation|Transportation)", label()).prop_map(
            |(url, currency, amount, category, label)| Inline::BudgetLink {
                url,
                currency,
                amount,
                category,
                label,
            }
        ),
        (url(), label()).prop_map(|(url, label)| Inline::TextLink { url, label }),
    ]
}

fn arb_block() -> impl Strategy<Value = Block> {
    let option = (any_text(), "[a-z]{5}", prop::collection::btree_set(any::<u64>(), 0..4))
        .prop_map(|(text, uid, votes)| PollOption { text, uid, votes });
    let budget = (any_text(), any_text(), "[A-Z]{3}", amount(), "(Accommodation|Transportation)")
        .prop_map(|(title, time, currency, amt, category)| TravelBudgetOption {
            title,
            time,
            currency,
            amt,
            category,
        });

    prop_oneof![
        prop::collection::vec(arb_inline(), 0..5).prop_map(Block::Paragraph),
        (any_text(), prop::collection::vec(option, 0..4))
            .prop_map(|(question, options)| Block::Poll { question, options }),
        (any_text(), any_text(), 0..TimelineColor::ALL.len(), any_text()).prop_map(
            |(time, icon, color, description)| Block::Timeline(TimelineItemNode::new(
                time,
                icon,
                TimelineColor::ALL[color],
                description
            ))
        ),
        (budget, prop::option::of(prop::collection::vec(arb_inline(), 0..3)))
            .prop_map(|(option, caption)| Block::TravelBudget { option, caption }),
    ]
}

fn labelled(
    txn: &mut Transaction<'_>,
    link: impl Into<NodePayload>,
    label: &str,
) -> Result<NodeKey, EditorError> {
    let link = txn.create_node(link)?;
    let text = txn.create_node(TextNode::new(label))?;
    txn.append(link, text)?;
    Ok(link)
}

fn create_inline(txn: &mut Transaction<'_>, inline: &Inline) -> Result<NodeKey, EditorError> {
    match inline {
        Inline::Text { text, format } => {
            txn.create_node(TextNode::new(text.as_str()).with_format(TextFormat::from_bits(*format)))
        }
        Inline::Link { url, rel, label } => {
            let mut link = LinkNode::new(url.as_str());
            link.link.rel = rel.clone();
            labelled(txn, link, label)
        }
        Inline::BudgetLink {
            url,
            currency,
            amount,
            category,
            label,
        } => labelled(
            txn,
            BudgetLinkNode::new(url.as_str(), currency.as_str(), *amount, category.as_str()),
            label,
        ),
        Inline::TextLink { url, label } => labelled(txn, TextLinkNode::new(url.as_str()), label),
    }
}

fn create_paragraph(txn: &mut Transaction<'_>, inlines: &[Inline]) -> Result<NodeKey, EditorError> {
    let paragraph = txn.create_node(ParagraphNode::new())?;
    for inline in inlines {
        let child = create_inline(txn, inline)?;
        txn.append(paragraph, child)?;
    }
    Ok(paragraph)
}

fn caption_state(inlines: &[Inline]) -> EditorState {
    let caption = Editor::default();
    caption
        .update(|txn| {
            let paragraph = create_paragraph(txn, inlines)?;
            txn.append(NodeKey::ROOT, paragraph)
        })
        .unwrap();
    let state = caption.state();
    (*state).clone()
}

fn build(blocks: &[Block]) -> Editor {
    let editor = Editor::default();
    editor
        .update(|txn| {
            for block in blocks {
                let key = match block {
                    Block::Paragraph(inlines) => create_paragraph(txn, inlines)?,
                    Block::Poll { question, options } => {
                        txn.create_node(PollNode::with_options(question.as_str(), options.clone()))?
                    }
                    Block::Timeline(item) => txn.create_node(item.clone())?,
                    Block::TravelBudget { option, caption } => {
                        let mut node = TravelBudgetNode::new(option.clone());
                        node.set_caption(caption.as_deref().map(caption_state));
                        txn.create_node(node)?
                    }
                };
                txn.append(NodeKey::ROOT, key)?;
            }
            Ok(())
        })
        .unwrap();
    editor
}

proptest! {
    #[test]
    fn prop_json_round_trip(blocks in prop::collection::vec(arb_block(), 0..6)) {
        let editor = build(&blocks);
        let json = editor.state().to_json();

        let (state, report) = EditorState::from_json(&json, editor.registry()).unwrap();
        prop_assert!(report.is_clean(), "recovered: {:?}", report.recovered);
        prop_assert_eq!(report.nodes, editor.state().len());
        prop_assert_eq!(state.to_json(), json);
    }

    #[test]
    fn prop_dom_round_trip(blocks in prop::collection::vec(arb_block(), 0..6)) {
        let editor = build(&blocks);
        let markup = generate_html(&editor.state());

        let imported = Editor::default();
        imported.update(|txn| txn.append_dom(NodeKey::ROOT, &markup)).unwrap();
        prop_assert_eq!(generate_html(&imported.state()), markup);
    }

    /// Equal priorities go to the type registered first
    #[test]
    fn prop_priority_ties_go_to_first_registered(priority in 0u8..=255, link_first in any::<bool>()) {
        let link = NodeDescriptor::of::<LinkNode>().with_dom_priority(priority);
        let text_link = NodeDescriptor::of::<TextLinkNode>().with_dom_priority(priority);
        let mut registry = NodeRegistry::new();
        if link_first {
            registry.register(link).unwrap();
            registry.register(text_link).unwrap();
        } else {
            registry.register(text_link).unwrap();
            registry.register(link).unwrap();
        }

        let anchor = DomElement::new("a")
            .with_attr("href", "https://x")
            .with_attr("data-type", "textlink");
        let converted = registry.convert_dom(&anchor);
        if link_first {
            prop_assert!(matches!(converted, Some(NodePayload::Link(_))));
        } else {
            prop_assert!(matches!(converted, Some(NodePayload::TextLink(_))));
        }
    }

    #[test]
    fn prop_higher_priority_wins(low in 0u8..128, gap in 1u8..128, text_link_higher in any::<bool>()) {
        let (link_priority, text_link_priority) = if text_link_higher {
            (low, low + gap)
        } else {
            (low + gap, low)
        };
        let mut registry = NodeRegistry::new();
        registry
            .register(NodeDescriptor::of::<LinkNode>().with_dom_priority(link_priority))
            .unwrap();
        registry
            .register(NodeDescriptor::of::<TextLinkNode>().with_dom_priority(text_link_priority))
            .unwrap();

        let anchor = DomElement::new("a").with_attr("data-type", "textlink");
        let converted = registry.convert_dom(&anchor);
        if text_link_higher {
            prop_assert!(matches!(converted, Some(NodePayload::TextLink(_))));
        } else {
            prop_assert!(matches!(converted, Some(NodePayload::Link(_))));
        }
    }
}

#[test]
fn test_default_anchor_priorities() {
    let registry = NodeRegistry::with_defaults();

    let plain = DomElement::new("a").with_attr("href", "https://x");
    assert!(matches!(registry.convert_dom(&plain), Some(NodePayload::Link(_))));

    let text_link = plain.clone().with_attr("data-type", "textlink");
    assert!(matches!(registry.convert_dom(&text_link), Some(NodePayload::TextLink(_))));

    let legacy = plain.with_attr("rel", "USD,100,Transportation");
    let Some(NodePayload::BudgetLink(link)) = registry.convert_dom(&legacy) else {
        panic!("expected budget link");
    };
    assert_eq!(link.amount(), 100.0);
}
