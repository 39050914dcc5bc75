//! Insights command - spending grouped by category or vendor.

use clap::{Args, ValueEnum};
use console::style;

use tally_core::pipeline::{CategoryInsights, VendorInsights};

use super::{emit_report, print_json, Context, OutputFormat};

#[derive(Args)]
pub struct InsightsArgs {
    /// What to group spending by
    #[arg(value_enum, default_value = "category")]
    by: GroupBy,

    /// With `top`, how many vendors to show (defaults to analytics.top_vendors)
    #[arg(short = 'n', long)]
    count: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum GroupBy {
    /// Totals per spending category
    Category,
    /// Totals per vendor
    Vendor,
    /// Vendors with the highest total spend
    Top,
}

pub async fn run(args: InsightsArgs, ctx: &Context) -> anyhow::Result<()> {
    let (processor, config) = ctx.processor()?;

    match args.by {
        GroupBy::Category => emit_report(processor.category_insights(), args.format, print_categories),
        GroupBy::Vendor => emit_report(processor.vendor_insights(), args.format, print_vendors),
        GroupBy::Top => {
            let top = processor.top_vendors(args.count.unwrap_or(config.analytics.top_vendors))?;
            match args.format {
                OutputFormat::Json => print_json(&top)?,
                OutputFormat::Table => {
                    for (rank, vendor) in top.iter().enumerate() {
                        println!("{:>3}. {:<30}  {:>10.2}", rank + 1, vendor.vendor, vendor.total_spent);
                    }
                }
            }
            Ok(())
        }
    }
}

fn print_categories(insights: &CategoryInsights) {
    println!(
        "{}",
        style(format!("{:<20}  {:>10}  {:>10}  {:>5}", "CATEGORY", "TOTAL", "AVERAGE", "COUNT")).bold()
    );
    for row in &insights.category_insights {
        println!(
            "{:<20}  {:>10.2}  {:>10.2}  {:>5}",
            row.category, row.total_spent, row.average_amount, row.transaction_count
        );
    }
    println!();
    println!("{} categories", insights.total_categories);
}

fn print_vendors(insights: &VendorInsights) {
    println!(
        "{}",
        style(format!("{:<30}  {:>10}  {:>10}  {:>6}", "VENDOR", "TOTAL", "AVERAGE", "VISITS")).bold()
    );
    for row in &insights.vendor_insights {
        println!(
            "{:<30}  {:>10.2}  {:>10.2}  {:>6}",
            row.vendor, row.total_spent, row.average_amount, row.visit_count
        );
    }
    println!();
    println!("{} vendors", insights.total_vendors);
}
