//! List command - filtered and optionally sorted receipt listing.

use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;

use tally_core::analytics::quicksort;
use tally_core::ReceiptFilter;

use super::{print_json, print_receipt_table, Context, OutputFormat};

#[derive(Args)]
pub struct ListArgs {
    /// Substring of filename, text or vendor
    #[arg(short, long)]
    keyword: Option<String>,

    /// Substring of the vendor
    #[arg(long)]
    vendor: Option<String>,

    /// Substring of the category
    #[arg(long)]
    category: Option<String>,

    #[arg(long)]
    currency: Option<String>,

    #[arg(long)]
    language: Option<String>,

    /// Earliest receipt date (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Latest receipt date (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,

    #[arg(long)]
    min_amount: Option<Decimal>,

    #[arg(long)]
    max_amount: Option<Decimal>,

    /// Maximum number of receipts
    #[arg(short = 'n', long)]
    limit: Option<usize>,

    #[arg(long, default_value = "0")]
    offset: usize,

    /// Sort by this field instead of newest first
    #[arg(long)]
    sort: Option<String>,

    /// Sort ascending
    #[arg(long, requires = "sort")]
    asc: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    format: OutputFormat,
}

pub async fn run(args: ListArgs, ctx: &Context) -> anyhow::Result<()> {
    let (processor, _) = ctx.processor()?;

    let filter = ReceiptFilter {
        keyword: args.keyword,
        vendor: args.vendor,
        category: args.category,
        currency: args.currency,
        language: args.language,
        date_from: args.from,
        date_to: args.to,
        amount_min: args.min_amount,
        amount_max: args.max_amount,
        limit: args.limit,
        offset: args.offset,
    };

    let mut receipts = processor.list(&filter)?;
    if let Some(field) = &args.sort {
        receipts = quicksort(&receipts, field, args.asc)?;
    }

    match args.format {
        OutputFormat::Json => print_json(&receipts)?,
        OutputFormat::Table => print_receipt_table(&receipts),
    }

    Ok(())
}
