//! Integration tests for the editor crate

use playground_editor::nodes::{
    BudgetLinkNode, LinkNode, ParagraphNode, PollNode, TextNode, TravelBudgetNode,
    TravelBudgetOption,
};
use playground_editor::{
    generate_html_string, to_markdown, DocumentJson, Editor, EditorCommand, EditorConfig,
    NodeKey, RenderOptions,
};
use serde_json::json;

fn fixture() -> serde_json::Value {
    json!({
        "root": {
            "type": "root",
            "version": 1,
            "direction": null,
            "format": "",
            "indent": 0,
            "children": [
                {
                    "type": "paragraph",
                    "version": 1,
                    "direction": null,
                    "format": "",
                    "indent": 0,
                    "children": [
                        {"type": "text", "version": 1, "text": "Ferry ", "format": 0, "detail": 0, "mode": "normal", "style": ""},
                        {
                            "type": "link",
                            "version": 1,
                            "url": "https://ferry.example",
                            "rel": "IDR,350000,Transportation",
                            "target": null,
                            "title": null,
                            "direction": null,
                            "format": "",
                            "indent": 0,
                            "children": [
                                {"type": "text", "version": 1, "text": "to Gili", "format": 1, "detail": 0, "mode": "normal", "style": ""}
                            ]
                        }
                    ]
                },
                {"type": "youtube", "version": 1, "videoID": "abc"},
                {"type": "text", "version": 1, "text": 5}
            ]
        }
    })
}

#[test]
fn test_budget_link_html() {
    let editor = Editor::default();
    editor
        .update(|txn| {
            let paragraph = txn.create_node(ParagraphNode::new())?;
            let link = txn.create_node(BudgetLinkNode::new("https://x", "USD", 120.0, "Transportation"))?;
            let label = txn.create_node(TextNode::new("Taxi"))?;
            txn.append(link, label)?;
            txn.append(paragraph, link)?;
            txn.append(NodeKey::ROOT, paragraph)
        })
        .unwrap();

    let html = generate_html_string(&editor.state(), &RenderOptions::default());
    assert_eq!(
        html,
        "<p><a href=\"https://x\" data-type=\"budgetlink\" data-currency=\"USD\" data-amount=\"120\" data-category=\"Transportation\">Taxi</a></p>"
    );
}

#[test]
fn test_poll_votes_toggle() {
    let editor = Editor::default();
    let (poll, uid) = editor
        .update(|txn| {
            let poll = txn.create_node(PollNode::new("Snorkel or dive?"))?;
            txn.append(NodeKey::ROOT, poll)?;
            let uid = txn.writable::<PollNode>(poll)?.add_option("Snorkel");
            Ok((poll, uid))
        })
        .unwrap();

    let voted = editor
        .update(|txn| Ok(txn.writable::<PollNode>(poll)?.toggle_vote(&uid, 42)))
        .unwrap();
    assert_eq!(voted, Some(true));
    let state = editor.state();
    let option = state.get::<PollNode>(poll).unwrap().option(&uid).unwrap();
    assert!(option.votes.contains(&42));

    let voted = editor
        .update(|txn| Ok(txn.writable::<PollNode>(poll)?.toggle_vote(&uid, 42)))
        .unwrap();
    assert_eq!(voted, Some(false));
    let state = editor.state();
    assert!(state.get::<PollNode>(poll).unwrap().option(&uid).unwrap().votes.is_empty());
    assert_eq!(state.get::<PollNode>(poll).unwrap().options().len(), 3);
}

#[test]
fn test_non_finite_travel_budget_amount_round_trips_as_zero() {
    let editor = Editor::default();
    let key = editor
        .update(|txn| {
            let key = txn.create_node(TravelBudgetNode::new(TravelBudgetOption {
                title: "Fast boat".to_string(),
                amt: f64::NAN,
                ..Default::default()
            }))?;
            txn.append(NodeKey::ROOT, key)?;
            Ok(key)
        })
        .unwrap();

    let state = editor.state();
    assert_eq!(state.get::<TravelBudgetNode>(key).unwrap().option().amt, 0.0);
    let exported = state.to_json();
    assert_eq!(exported["root"]["children"][0]["option"]["amt"], json!(0));

    let reloaded = Editor::default();
    let report = reloaded.load_state_json(&exported).unwrap();
    assert!(report.is_clean());
    assert_eq!(reloaded.state().to_json(), exported);
}

#[test]
fn test_load_recovers_undecodable_nodes() {
    let editor = Editor::default();
    let report = editor.load_state_json(&fixture()).unwrap();

    assert!(!report.is_clean());
    assert_eq!(report.nodes, 7);
    let tags: Vec<&str> = report.recovered.iter().map(|r| r.type_tag.as_str()).collect();
    assert_eq!(tags, vec!["youtube", "text"]);

    // Placeholders export what was read
    let exported = editor.state().to_json();
    assert_eq!(exported["root"]["children"][1], fixture()["root"]["children"][1]);
    assert_eq!(exported["root"]["children"][2], fixture()["root"]["children"][2]);
}

#[test]
fn test_legacy_budget_link_upgraded_on_load() {
    let editor = Editor::default();
    editor.load_state_json(&fixture()).unwrap();

    let state = editor.state();
    let links = state.nodes_of_type::<BudgetLinkNode>();
    assert_eq!(links.len(), 1);
    let (_, link) = links[0];
    assert_eq!(link.currency(), "IDR");
    assert_eq!(link.amount(), 350_000.0);
    assert_eq!(link.category(), "Transportation");
    assert_eq!(link.link.rel, None);
    assert_eq!(to_markdown(&state), "Ferry [**to Gili**](https://ferry.example)");
}

#[test]
fn test_legacy_upgrade_can_be_disabled() {
    let config = EditorConfig {
        upgrade_legacy_budget_links: false,
        ..Default::default()
    };
    let editor = Editor::new(config).unwrap();
    editor.load_state_json(&fixture()).unwrap();

    let state = editor.state();
    assert!(state.nodes_of_type::<BudgetLinkNode>().is_empty());
    let links = state.nodes_of_type::<LinkNode>();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].1.link.rel.as_deref(), Some("IDR,350000,Transportation"));
}

#[test]
fn test_missing_root_fails_load() {
    let editor = Editor::default();
    assert!(editor.load_state_json(&json!({"children": []})).is_err());
    assert!(editor
        .load_state_json(&json!({"root": {"type": "paragraph", "version": 1}}))
        .is_err());
    assert_eq!(editor.state().len(), 1);
}

#[test]
fn test_commands_and_markdown() {
    let editor = Editor::default();
    editor
        .dispatch_command(EditorCommand::InsertBudgetLink {
            url: "https://hotel.example".to_string(),
            currency: "EUR".to_string(),
            amount: 89.5,
            category: "Accommodation".to_string(),
            text: Some("Hotel".to_string()),
        })
        .unwrap();
    editor
        .dispatch_command(EditorCommand::InsertPoll {
            question: "Dinner?".to_string(),
        })
        .unwrap();

    assert_eq!(
        to_markdown(&editor.state()),
        "[Hotel](https://hotel.example)\n\n**Dinner?**\n- [ ] \n- [ ] "
    );
}

#[test]
fn test_document_file_round_trip() -> anyhow::Result<()> {
    let dir = std::env::temp_dir().join(format!("playground-doc-{}", std::process::id()));
    std::fs::create_dir_all(&dir)?;
    let path = dir.join("trip.json");

    let editor = Editor::default();
    editor.dispatch_command(EditorCommand::PasteText(
        "https://www.booking.com/hotel/id/alila-seminyak.en-gb.html".to_string(),
    ))?;
    editor.export_document().write(&path)?;

    let document = DocumentJson::read(&path)?;
    assert_eq!(document.source, "Playground");

    let reloaded = Editor::default();
    let report = reloaded.load_document(&document)?;
    assert!(report.is_clean());
    assert_eq!(reloaded.state().text_content(), "Alila Seminyak");

    std::fs::remove_dir_all(&dir)?;
    Ok(())
}
