//! Spending commands - period totals, analytics and the dashboard.

use clap::Args;
use console::style;

use tally_core::analytics::Period;
use tally_core::pipeline::{Dashboard, SpendingAnalytics, SpendingSummary};

use super::{emit_report, print_receipt_table, Context, OutputFormat};

#[derive(Args)]
pub struct SpendingArgs {
    /// Bucket size: day, week or month
    #[arg(short, long, default_value = "month")]
    period: Period,

    /// Show the store-wide summary instead of period totals
    #[arg(long, conflicts_with = "by_currency")]
    summary: bool,

    /// Show totals per currency instead of period totals
    #[arg(long)]
    by_currency: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    format: OutputFormat,
}

#[derive(Args)]
pub struct AnalyticsArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    format: OutputFormat,
}

#[derive(Args)]
pub struct DashboardArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    format: OutputFormat,
}

pub async fn run(args: SpendingArgs, ctx: &Context) -> anyhow::Result<()> {
    let (processor, _) = ctx.processor()?;

    if args.summary {
        return emit_report(processor.spending_summary(), args.format, print_summary);
    }

    if args.by_currency {
        return emit_report(processor.currency_summary(), args.format, |totals| {
            for (currency, total) in totals {
                println!("{:<4}  {:>12.2}  ({} receipts)", currency, total.total, total.count);
            }
        });
    }

    emit_report(processor.spending_by_period(args.period), args.format, |buckets| {
        println!("{}", style(format!("Spending per {}", args.period)).bold());
        for (label, total) in buckets {
            println!("{:<23}  {:>12.2}", label, total);
        }
    })
}

pub async fn run_analytics(args: AnalyticsArgs, ctx: &Context) -> anyhow::Result<()> {
    let (processor, _) = ctx.processor()?;
    emit_report(processor.spending_analytics(), args.format, print_analytics)
}

pub async fn run_dashboard(args: DashboardArgs, ctx: &Context) -> anyhow::Result<()> {
    let (processor, _) = ctx.processor()?;
    emit_report(processor.dashboard(), args.format, print_dashboard)
}

fn print_summary(summary: &SpendingSummary) {
    println!("Receipts:  {}", summary.total_receipts);
    println!("Total:     {:.2}", summary.total_spent);
    println!("Average:   {:.2}", summary.avg_amount);
    println!("Median:    {:.2}", summary.median_spend);
    println!("Smallest:  {:.2}", summary.min_amount);
    println!("Largest:   {:.2}", summary.max_amount);
    if let (Some(earliest), Some(latest)) = (summary.earliest_date, summary.latest_date) {
        println!("Period:    {} to {}", earliest, latest);
    }
}

fn print_analytics(analytics: &SpendingAnalytics) {
    println!("Receipts:  {}", analytics.total_receipts);
    println!("Total:     {:.2}", analytics.total_spending);
    println!("Average:   {:.2}", analytics.average_spending);
    println!("Median:    {:.2}", analytics.median_spending);
    if let Some(category) = &analytics.most_common_category {
        println!("Most common category: {}", category);
    }

    println!();
    println!("{}", style("By category").bold());
    for (category, stats) in &analytics.category_breakdown {
        let sum = stats.get("amount_sum").copied().unwrap_or_default();
        let count = stats.get("amount_count").copied().unwrap_or_default();
        println!("  {:<20}  {:>10.2}  ({} receipts)", category, sum, count);
    }

    println!();
    println!("{}", style("By month").bold());
    for (month, total) in &analytics.monthly_spending {
        println!("  {:<7}  {:>10.2}", month, total);
    }
}

fn print_dashboard(dashboard: &Dashboard) {
    print_summary(&dashboard.summary);

    if !dashboard.top_vendors.is_empty() {
        println!();
        println!("{}", style("Top vendors").bold());
        for vendor in &dashboard.top_vendors {
            println!("  {:<30}  {:>10.2}", vendor.vendor, vendor.total_spent);
        }
    }

    println!();
    println!("{}", style("Recent receipts").bold());
    print_receipt_table(&dashboard.recent_receipts);
}
