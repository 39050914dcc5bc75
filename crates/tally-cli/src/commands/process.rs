//! Process command - extract and store a single receipt file.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use tally_core::{MemoryStore, ProcessOutcome, ReceiptProcessor};

use super::{print_json, Context, OutputFormat};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (text, PDF or image)
    #[arg(required = true)]
    input: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    format: OutputFormat,

    /// Extract fields without storing the receipt
    #[arg(long)]
    dry_run: bool,
}

pub async fn run(args: ProcessArgs, ctx: &Context) -> anyhow::Result<()> {
    let start = Instant::now();

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let filename = args
        .input
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .to_string();

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message("Reading file...");

    let bytes = tokio::fs::read(&args.input).await?;

    pb.set_message("Extracting receipt fields...");
    let outcome = if args.dry_run {
        let config = ctx.load_config()?;
        let mut processor = ReceiptProcessor::from_config(MemoryStore::new(), &config)?;
        processor.process_document(&bytes, &filename)
    } else {
        let (mut processor, _) = ctx.processor()?;
        processor.process_document(&bytes, &filename)
    };
    pb.finish_and_clear();

    match args.format {
        OutputFormat::Json => print_json(&outcome)?,
        OutputFormat::Table => print_outcome(&outcome, args.dry_run),
    }

    debug!("Total processing time: {:?}", start.elapsed());

    if !outcome.success {
        anyhow::bail!(
            "Failed to process {}: {}",
            outcome.filename,
            outcome.error.as_deref().unwrap_or("unknown error")
        );
    }

    Ok(())
}

fn print_outcome(outcome: &ProcessOutcome, dry_run: bool) {
    if let Some(fields) = &outcome.extracted {
        match (outcome.receipt_id, dry_run) {
            (Some(id), false) => println!("{} Stored receipt #{}", style("✓").green(), id),
            _ => println!("{} Extracted {}", style("✓").green(), outcome.filename),
        }
        println!("  Vendor:   {}", fields.vendor);
        println!("  Amount:   {:.2}", fields.amount);
        println!("  Date:     {}", fields.date);
        println!("  Category: {}", fields.category);
    }

    for warning in &outcome.warnings {
        println!("  {} {}", style("⚠").yellow(), warning);
    }
}
