use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use playground_editor::nodes::{TimelineColor, TimelineItemNode, TravelBudgetOption};
use playground_editor::{Editor, EditorCommand, EditorConfig, DEFAULT_CONFIG_NAME};
use std::fs;
use std::path::Path;

const EXAMPLE_DOCUMENT: &str = "example.json";

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Source name written into saved documents
    #[arg(short, long, default_value = "Playground")]
    pub source: String,

    /// Skip writing example.json
    #[arg(long)]
    pub no_example: bool,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &Path) -> Result<()> {
    let config_path = cwd.join(DEFAULT_CONFIG_NAME);

    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing playground...".bright_blue().bold());

    let config = EditorConfig {
        source: args.source.clone(),
        ..Default::default()
    };
    fs::write(&config_path, config.to_json_pretty()?)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);

    let example_path = cwd.join(EXAMPLE_DOCUMENT);
    if !args.no_example && !example_path.exists() {
        let editor = Editor::new(config)?;
        write_example(&editor, &example_path)?;
        println!("  {} Created {}", "✓".green(), EXAMPLE_DOCUMENT);
    }

    println!();
    println!("{}", "✅ Playground initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Run: playground check {}", EXAMPLE_DOCUMENT);
    println!("  2. Run: playground export {} --format html", EXAMPLE_DOCUMENT);

    Ok(())
}

/// A small itinerary using each built-in insert command
fn write_example(editor: &Editor, path: &Path) -> Result<()> {
    let commands = [
        EditorCommand::InsertTimelineItem(TimelineItemNode::new(
            "09:00",
            "plane",
            TimelineColor::Blue,
            "Fly to Denpasar",
        )),
        EditorCommand::InsertBudgetLink {
            url: "https://www.booking.com/hotel/id/alila-seminyak.en-gb.html".to_string(),
            currency: "IDR".to_string(),
            amount: 2_400_000.0,
            category: "Accommodation".to_string(),
            text: Some("Alila Seminyak".to_string()),
        },
        EditorCommand::InsertTravelBudget(TravelBudgetOption {
            title: "Fast boat to Gili".to_string(),
            time: "Day 3".to_string(),
            currency: "IDR".to_string(),
            amt: 350_000.0,
            category: "Transportation".to_string(),
        }),
        EditorCommand::InsertPoll {
            question: "Snorkelling or diving?".to_string(),
        },
        EditorCommand::PasteText("https://www.klook.com/activity/1234-ubud-rice-terrace-tour/".to_string()),
    ];
    for command in commands {
        editor.dispatch_command(command)?;
    }

    editor
        .export_document()
        .write(path)
        .with_context(|| format!("Failed to write {}", path.display()))
}
