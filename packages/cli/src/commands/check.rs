use crate::config::editor_for;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use playground_editor::{DocumentJson, Editor, ImportReport};
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Saved documents to check
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Fail when any node had to be recovered
    #[arg(long)]
    pub strict: bool,
}

pub fn check(args: CheckArgs, cwd: &Path) -> Result<()> {
    let editor = editor_for(cwd)?;

    println!("{}", "🔍 Checking documents...".bright_blue().bold());

    let mut failed = 0;
    let mut recovered = 0;
    for input in &args.inputs {
        match check_file(&editor, &cwd.join(input)) {
            Ok(report) => {
                recovered += report.recovered.len();
                print_report(input, &report);
            }
            Err(e) => {
                failed += 1;
                eprintln!(
                    "  {} {} - {}",
                    "✗".red(),
                    input.display(),
                    format!("{:#}", e).red()
                );
            }
        }
    }

    println!();
    if failed == 0 && recovered == 0 {
        println!("{} {} document(s) OK", "✅".green(), args.inputs.len());
        return Ok(());
    }
    println!(
        "{} {} failed to load, {} node(s) recovered",
        "⚠️".yellow(),
        failed,
        recovered
    );

    if failed > 0 {
        return Err(anyhow!("{} of {} document(s) failed to load", failed, args.inputs.len()));
    }
    if args.strict {
        return Err(anyhow!("{} node(s) could not be decoded", recovered));
    }
    Ok(())
}

fn check_file(editor: &Editor, path: &Path) -> Result<ImportReport> {
    let document = DocumentJson::read(path)?;
    Ok(editor.load_document(&document)?)
}

fn print_report(input: &Path, report: &ImportReport) {
    if report.is_clean() {
        println!("  {} {} ({} nodes)", "✓".green(), input.display(), report.nodes);
        return;
    }
    println!(
        "  {} {} ({} nodes, {} recovered)",
        "⚠️".yellow(),
        input.display(),
        report.nodes,
        report.recovered.len()
    );
    for node in &report.recovered {
        println!(
            "      {} {} - {}",
            node.key.to_string().dimmed(),
            node.type_tag.bright_white(),
            node.reason
        );
    }
}
