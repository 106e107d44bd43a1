//! `tether sync` — process one event batch against the root.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use tether_engine::EventBatch;

use super::{print_report, print_report_json, StoreArgs};

/// Arguments for `tether sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Path to the JSON event batch (omit to read from stdin).
    #[arg(long)]
    pub batch: Option<PathBuf>,

    /// Marker token a source must contain to qualify.
    #[arg(long, default_value = "tether:derive")]
    pub marker: String,

    /// Emit the report as JSON instead of the human summary.
    #[arg(long)]
    pub json: bool,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        self.store.validate()?;

        let batch = match &self.batch {
            Some(path) => EventBatch::from_json_file(path)
                .with_context(|| format!("reading batch from {}", path.display()))?,
            None => {
                let mut buf = String::new();
                std::io::stdin()
                    .read_to_string(&mut buf)
                    .context("reading batch from stdin")?;
                EventBatch::from_json(&buf).context("parsing batch from stdin")?
            }
        };

        let engine = self.store.engine(&self.marker);
        let report = engine.process_batch(&batch).context("sync failed")?;

        if self.json {
            print_report_json(&report)?;
        } else {
            print_report(&report);
        }
        Ok(())
    }
}
