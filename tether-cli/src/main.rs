//! Tether — source-to-artifact synchronization CLI.
//!
//! # Usage
//!
//! ```text
//! tether sync --root <dir> [--batch <file>] [--marker <token>] [--json]
//! tether scan --root <dir> [--marker <token>] [--json]
//! tether list --root <dir>
//! ```
//!
//! The binary is a thin shell: it turns a JSON event batch (or a tree scan)
//! into one engine run and prints the per-item outcomes. Watching the file
//! system and deciding when a batch is ready is the host's job.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{list::ListArgs, scan::ScanArgs, sync::SyncArgs};

#[derive(Parser, Debug)]
#[command(
    name = "tether",
    version,
    about = "Keep derived artifacts linked one-to-one with their source files",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Process an event batch (JSON from a file or stdin) against the root.
    Sync(SyncArgs),

    /// Synthesize a created-batch from every source file under the root.
    Scan(ScanArgs),

    /// List registered artifacts and their source links.
    List(ListArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Sync(args) => args.run(),
        Commands::Scan(args) => args.run(),
        Commands::List(args) => args.run(),
    }
}
