use crate::config::editor_for;
use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use colored::Colorize;
use playground_editor::{generate_html_string, to_markdown, DocumentJson, Editor, RenderOptions};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Html,
    Markdown,
    /// Re-serialized document envelope
    Json,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Saved document (JSON envelope)
    pub input: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "html")]
    pub format: ExportFormat,

    /// Indent HTML output
    #[arg(long)]
    pub pretty: bool,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn export(args: ExportArgs, cwd: &Path) -> Result<()> {
    let editor = editor_for(cwd)?;
    let input = cwd.join(&args.input);
    let document = DocumentJson::read(&input)
        .with_context(|| format!("Failed to read document {}", input.display()))?;

    let report = editor.load_document(&document)?;
    if !report.is_clean() {
        eprintln!(
            "{} {} node(s) could not be decoded and were kept as placeholders",
            "⚠️".yellow(),
            report.recovered.len()
        );
    }

    let rendered = render(&editor, args.format, args.pretty)?;
    match &args.output {
        Some(output) => {
            let output = cwd.join(output);
            fs::write(&output, &rendered)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            eprintln!(
                "  {} {} → {}",
                "✓".green(),
                args.input.display(),
                output.display()
            );
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

fn render(editor: &Editor, format: ExportFormat, pretty: bool) -> Result<String> {
    let state = editor.state();
    let rendered = match format {
        ExportFormat::Html => {
            let options = RenderOptions {
                pretty,
                ..Default::default()
            };
            generate_html_string(&state, &options)
        }
        ExportFormat::Markdown => to_markdown(&state),
        ExportFormat::Json => editor.export_document().to_string_pretty()?,
    };
    Ok(rendered)
}
