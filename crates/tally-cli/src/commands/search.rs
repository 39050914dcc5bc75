//! Search command - keyword relevance search over stored receipts.

use clap::Args;
use console::style;

use super::{print_json, receipt_line, Context, OutputFormat};

#[derive(Args)]
pub struct SearchArgs {
    /// Space separated keywords; an empty query lists everything
    query: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    format: OutputFormat,
}

pub async fn run(args: SearchArgs, ctx: &Context) -> anyhow::Result<()> {
    let (processor, _) = ctx.processor()?;
    let hits = processor.search(args.query.as_deref().unwrap_or(""));

    if let OutputFormat::Json = args.format {
        return print_json(&hits);
    }

    if hits.is_empty() {
        println!("{} No matching receipts.", style("ℹ").blue());
        return Ok(());
    }

    println!("{}", style(format!("{:>5}  {}", "SCORE", "RECEIPT")).bold());
    for hit in &hits {
        let score = hit.relevance_score.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string());
        println!("{:>5}  {}", score, receipt_line(&hit.record));
    }

    Ok(())
}
