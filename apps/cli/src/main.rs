//! Courtline CLI — checkpointed enrichment of Czech court-decision data.
//!
//! Augments Stage-1 scraped decisions with infosoud case timelines and
//! parses legal citation strings into structured references.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
