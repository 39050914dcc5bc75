//! Delete command - remove one receipt or empty the store.

use clap::Args;
use console::style;

use tally_core::{ReceiptId, ReceiptStore};

use super::Context;

#[derive(Args)]
pub struct DeleteArgs {
    /// Receipt id
    #[arg(required_unless_present = "all", conflicts_with = "all")]
    id: Option<ReceiptId>,

    /// Delete every stored receipt
    #[arg(long)]
    all: bool,
}

pub async fn run(args: DeleteArgs, ctx: &Context) -> anyhow::Result<()> {
    if args.all {
        let config = ctx.load_config()?;
        let mut store = ctx.open_store(&config)?;
        store.clear()?;
        println!("{} Deleted all receipts", style("✓").green());
        return Ok(());
    }

    let Some(id) = args.id else {
        anyhow::bail!("A receipt id or --all is required");
    };

    let (mut processor, _) = ctx.processor()?;
    processor.delete(id)?;
    println!("{} Deleted receipt #{}", style("✓").green(), id);

    Ok(())
}
