use anyhow::Result;
use clap::Parser;
use ledger_store::cli::Cli;
use ledger_store::logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    cli.run().await
}
