//! Subcommands and the helpers they share.

pub mod batch;
pub mod config;
pub mod correct;
pub mod delete;
pub mod export;
pub mod insights;
pub mod list;
pub mod process;
pub mod search;
pub mod spending;

use std::path::PathBuf;

use console::style;
use serde::Serialize;
use tracing::debug;

use tally_core::{JsonStore, Receipt, ReceiptProcessor, Report, TallyConfig};

/// Global options every command needs.
pub struct Context {
    pub config_path: Option<PathBuf>,
    pub store_path: Option<PathBuf>,
}

impl Context {
    /// Configuration from `--config`, else the default config file, else
    /// built-in defaults.
    pub fn load_config(&self) -> anyhow::Result<TallyConfig> {
        if let Some(path) = &self.config_path {
            return Ok(TallyConfig::from_file(path)?);
        }

        let default_path = config::default_config_path();
        if default_path.exists() {
            debug!("Using config from {}", default_path.display());
            Ok(TallyConfig::from_file(&default_path)?)
        } else {
            Ok(TallyConfig::default())
        }
    }

    pub fn store_path(&self, config: &TallyConfig) -> PathBuf {
        self.store_path.clone().unwrap_or_else(|| config.store.path.clone())
    }

    pub fn open_store(&self, config: &TallyConfig) -> anyhow::Result<JsonStore> {
        let path = self.store_path(config);
        debug!("Opening receipt store at {}", path.display());
        Ok(JsonStore::open(path)?)
    }

    /// Processor over the JSON store.
    pub fn processor(&self) -> anyhow::Result<(ReceiptProcessor<JsonStore>, TallyConfig)> {
        let config = self.load_config()?;
        let store = self.open_store(&config)?;
        let processor = ReceiptProcessor::from_config(store, &config)?;
        Ok((processor, config))
    }
}

#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print an analytics report, failing the command if the report failed.
pub fn emit_report<T, F>(report: Report<T>, format: OutputFormat, table: F) -> anyhow::Result<()>
where
    T: Serialize,
    F: FnOnce(&T),
{
    if let OutputFormat::Json = format {
        print_json(&report)?;
    }

    match report {
        Report::Data(data) => {
            if let OutputFormat::Table = format {
                table(&data);
            }
            Ok(())
        }
        Report::NoData => {
            if let OutputFormat::Table = format {
                println!("{} No receipts stored yet.", style("ℹ").blue());
            }
            Ok(())
        }
        Report::Failed { error } => anyhow::bail!("{}", error),
    }
}

pub fn print_receipt_table(receipts: &[Receipt]) {
    if receipts.is_empty() {
        println!("{} No receipts found.", style("ℹ").blue());
        return;
    }

    println!(
        "{}",
        style(format!(
            "{:>5}  {:<10}  {:<30}  {:>10}  {:<4}  {}",
            "ID", "DATE", "VENDOR", "AMOUNT", "CUR", "CATEGORY"
        ))
        .bold()
    );
    for receipt in receipts {
        println!("{}", receipt_line(receipt));
    }
}

pub fn receipt_line(receipt: &Receipt) -> String {
    format!(
        "{:>5}  {:<10}  {:<30}  {:>10.2}  {:<4}  {}",
        receipt.id().map(|id| id.to_string()).unwrap_or_default(),
        receipt.date().to_string(),
        receipt.vendor(),
        receipt.amount(),
        receipt.currency(),
        receipt.category()
    )
}
