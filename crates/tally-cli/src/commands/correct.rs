//! Correct command - fix extracted fields of a stored receipt.

use clap::Args;
use console::style;

use tally_core::{ReceiptId, ReceiptUpdate};

use super::{print_json, receipt_line, Context, OutputFormat};

#[derive(Args)]
pub struct CorrectArgs {
    /// Receipt id
    id: ReceiptId,

    #[arg(long)]
    vendor: Option<String>,

    /// Amount as a decimal number
    #[arg(long)]
    amount: Option<String>,

    /// Date as YYYY-MM-DD
    #[arg(long)]
    date: Option<String>,

    #[arg(long)]
    category: Option<String>,

    #[arg(long)]
    currency: Option<String>,

    #[arg(long)]
    language: Option<String>,

    #[arg(long)]
    filename: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    format: OutputFormat,
}

pub async fn run(args: CorrectArgs, ctx: &Context) -> anyhow::Result<()> {
    let update = ReceiptUpdate {
        filename: args.filename,
        vendor: args.vendor,
        date: args.date,
        amount: args.amount,
        category: args.category,
        text: None,
        currency: args.currency,
        language: args.language,
    };

    if update.is_empty() {
        anyhow::bail!("Nothing to correct. Pass at least one field, e.g. --vendor or --amount.");
    }

    let (mut processor, _) = ctx.processor()?;
    let receipt = processor.correct(args.id, &update)?;

    match args.format {
        OutputFormat::Json => print_json(&receipt)?,
        OutputFormat::Table => {
            println!("{} Updated receipt #{}", style("✓").green(), args.id);
            println!("{}", receipt_line(&receipt));
        }
    }

    Ok(())
}
