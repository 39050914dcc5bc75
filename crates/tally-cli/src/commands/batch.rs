//! Batch processing command for multiple receipt files.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

use tally_core::ProcessOutcome;

use super::{print_json, Context, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern of input files
    #[arg(required = true)]
    input: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    format: OutputFormat,

    /// Write a summary CSV of all outcomes
    #[arg(long)]
    summary: Option<PathBuf>,
}

pub async fn run(args: BatchArgs, ctx: &Context) -> anyhow::Result<()> {
    let start = Instant::now();
    let (mut processor, _) = ctx.processor()?;

    // Every match is handed to the processor; unsupported types fail there.
    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file())
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    if let OutputFormat::Table = args.format {
        println!("{} Found {} files to process", style("ℹ").blue(), files.len());
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let mut documents = Vec::with_capacity(files.len());
    let mut unreadable = Vec::new();
    for (index, path) in files.iter().enumerate() {
        let filename = path.file_name().and_then(|n| n.to_str()).unwrap_or("").to_string();

        match tokio::fs::read(path).await {
            Ok(bytes) => documents.push((bytes, filename)),
            Err(e) => {
                warn!("Cannot read {}: {}", path.display(), e);
                unreadable.push((index, unreadable_outcome(filename, &e)));
            }
        }
        pb.inc(1);
    }

    let mut outcomes = processor.process_batch(documents);
    for (index, outcome) in unreadable {
        outcomes.insert(index, outcome);
    }

    pb.finish_and_clear();

    if let Some(summary_path) = &args.summary {
        write_summary(summary_path, &outcomes)?;
    }

    match args.format {
        OutputFormat::Json => print_json(&outcomes)?,
        OutputFormat::Table => print_results(&outcomes, start, args.summary.as_deref()),
    }

    Ok(())
}

fn unreadable_outcome(filename: String, e: &std::io::Error) -> ProcessOutcome {
    ProcessOutcome {
        filename,
        success: false,
        receipt_id: None,
        extracted: None,
        warnings: Vec::new(),
        error: Some(format!("read error: {}", e)),
    }
}

fn print_results(outcomes: &[ProcessOutcome], start: Instant, summary: Option<&Path>) {
    let (successful, failed): (Vec<_>, Vec<_>) = outcomes.iter().partition(|o| o.success);

    if let Some(path) = summary {
        println!("{} Summary written to {}", style("✓").green(), path.display());
    }

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        outcomes.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for outcome in &failed {
            println!(
                "  - {}: {}",
                outcome.filename,
                outcome.error.as_deref().unwrap_or("unknown error")
            );
        }
    }
}

fn write_summary(path: &Path, outcomes: &[ProcessOutcome]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "receipt_id",
        "vendor",
        "amount",
        "date",
        "category",
        "warnings",
        "error",
    ])?;

    for outcome in outcomes {
        let status = if outcome.success { "success" } else { "error" };
        let id = outcome.receipt_id.map(|id| id.to_string()).unwrap_or_default();
        let warnings = outcome.warnings.join("; ");
        let (vendor, amount, date, category) = match &outcome.extracted {
            Some(fields) => (
                fields.vendor.clone(),
                fields.amount.to_string(),
                fields.date.to_string(),
                fields.category.clone(),
            ),
            None => Default::default(),
        };

        let row: [&str; 9] = [
            &outcome.filename,
            status,
            &id,
            &vendor,
            &amount,
            &date,
            &category,
            &warnings,
            outcome.error.as_deref().unwrap_or(""),
        ];
        wtr.write_record(row)?;
    }

    wtr.flush()?;
    Ok(())
}
