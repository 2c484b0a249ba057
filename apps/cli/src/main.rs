//! RankScope CLI: keyword rankings and AI-engine visibility for a domain.
//!
//! Runs the aggregation engine against the configured Record Source and
//! renders the resulting views as tables, JSON, or CSV.

mod commands;
mod render;

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
