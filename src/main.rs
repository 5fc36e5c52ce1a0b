use clap::Parser;
use convince_runtime::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve => cli::serve::run().await,
        Command::Extract(args) => cli::extract::run(args).await,
        Command::Entry(args) => cli::entry::run(args).await,
        Command::EntryId(args) => cli::entry_id::run(args),
    }
}
