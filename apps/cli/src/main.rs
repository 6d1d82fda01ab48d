//! Dossier CLI — delivery-document assembly for process records.
//!
//! Fetches a record's stored PDFs, renders the satisfaction-survey
//! report, merges and publishes the result, and finalizes the record.

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
