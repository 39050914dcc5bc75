//! CLI application for receipt tracking and spending analytics.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use commands::{batch, config, correct, delete, export, insights, list, process, search, spending, Context};

/// Tally - Extract, store and analyse receipts
#[derive(Parser)]
#[command(name = "tally")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the receipt store (overrides store.path from the config)
    #[arg(short, long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract and store a single receipt file
    Process(process::ProcessArgs),

    /// Extract and store multiple receipt files
    Batch(batch::BatchArgs),

    /// Rank stored receipts by keyword relevance
    Search(search::SearchArgs),

    /// List stored receipts
    List(list::ListArgs),

    /// Per-category or per-vendor spending insights
    Insights(insights::InsightsArgs),

    /// Spending per day, week or month
    Spending(spending::SpendingArgs),

    /// Aggregate spending analytics
    Analytics(spending::AnalyticsArgs),

    /// Summary, recent receipts and top vendors
    Dashboard(spending::DashboardArgs),

    /// Correct fields of a stored receipt
    Correct(correct::CorrectArgs),

    /// Delete stored receipts
    Delete(delete::DeleteArgs),

    /// Export stored receipts
    Export(export::ExportArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over -v
    let builder = FmtSubscriber::builder()
        .with_target(false)
        .with_writer(std::io::stderr);

    if std::env::var_os("RUST_LOG").is_some() {
        let subscriber = builder.with_env_filter(EnvFilter::from_default_env()).finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let level = match cli.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        };
        let subscriber = builder.with_max_level(level).finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }

    let ctx = Context {
        config_path: cli.config,
        store_path: cli.store,
    };

    match cli.command {
        Commands::Process(args) => process::run(args, &ctx).await,
        Commands::Batch(args) => batch::run(args, &ctx).await,
        Commands::Search(args) => search::run(args, &ctx).await,
        Commands::List(args) => list::run(args, &ctx).await,
        Commands::Insights(args) => insights::run(args, &ctx).await,
        Commands::Spending(args) => spending::run(args, &ctx).await,
        Commands::Analytics(args) => spending::run_analytics(args, &ctx).await,
        Commands::Dashboard(args) => spending::run_dashboard(args, &ctx).await,
        Commands::Correct(args) => correct::run(args, &ctx).await,
        Commands::Delete(args) => delete::run(args, &ctx).await,
        Commands::Export(args) => export::run(args, &ctx).await,
        Commands::Config(args) => config::run(args, &ctx).await,
    }
}
