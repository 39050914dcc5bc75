//! Export command - dump stored receipts as JSON or CSV.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use console::style;

use tally_core::Receipt;

use super::Context;

#[derive(Args)]
pub struct ExportArgs {
    /// Export format
    #[arg(short, long, value_enum, default_value = "json")]
    format: ExportFormat,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ExportFormat {
    /// Export document with summary statistics
    Json,
    /// One row per receipt
    Csv,
}

pub async fn run(args: ExportArgs, ctx: &Context) -> anyhow::Result<()> {
    let (processor, _) = ctx.processor()?;
    let document = processor.export()?;

    let content = match args.format {
        ExportFormat::Json => serde_json::to_string_pretty(&document)?,
        ExportFormat::Csv => format_csv(&document.receipts)?,
    };

    if let Some(output_path) = &args.output {
        tokio::fs::write(output_path, &content).await?;
        println!(
            "{} Exported {} receipts to {}",
            style("✓").green(),
            document.export_info.total_receipts,
            output_path.display()
        );
    } else {
        print!("{}", content);
        if let ExportFormat::Json = args.format {
            println!();
        }
    }

    Ok(())
}

fn format_csv(receipts: &[Receipt]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "filename",
        "vendor",
        "amount",
        "currency",
        "date",
        "category",
        "language",
        "upload_date",
    ])?;

    for receipt in receipts {
        wtr.write_record([
            receipt.filename().to_string(),
            receipt.vendor().to_string(),
            receipt.amount().to_string(),
            receipt.currency().to_string(),
            receipt.date().to_string(),
            receipt.category().to_string(),
            receipt.language().to_string(),
            receipt.uploaded_at().to_rfc3339(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}
