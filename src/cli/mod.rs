//! Command line interface
//!
//! - `serve`: REST server
//! - `extract`: run a retriever over a text and print the result as JSON
//! - `entry`: propose, approve or override a stored entry
//! - `entry-id`: compute or check an entry id

pub mod entry;
pub mod entry_id;
pub mod extract;
pub mod serve;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Convince runtime - parameter extraction from free text
#[derive(Parser)]
#[command(name = "convince-runtime")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the REST server
    Serve,

    /// Extract one parameter from a text
    Extract(extract::ExtractArgs),

    /// Propose, approve or override a stored entry
    Entry(entry::EntryArgs),

    /// Compute or check an entry id
    EntryId(entry_id::EntryIdArgs),
}

/// Load `.env` and the layered configuration, then install logging
pub(crate) fn load_config() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logging(&config.logging);

    Ok(config)
}
