//! `tether scan` — reconcile the whole tree by synthesizing a created-batch.
//!
//! The engine itself never rescans; this is the host-side bootstrap for a
//! tree that existed before tether did.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use tether_engine::EventBatch;

use super::{print_report, print_report_json, StoreArgs};

/// Arguments for `tether scan`.
#[derive(Args, Debug)]
pub struct ScanArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Marker token a source must contain to qualify.
    #[arg(long, default_value = "tether:derive")]
    pub marker: String,

    /// Emit the report as JSON instead of the human summary.
    #[arg(long)]
    pub json: bool,
}

impl ScanArgs {
    pub fn run(self) -> Result<()> {
        self.store.validate()?;

        let sources = collect_sources(&self.store.root, &self.store.source_ext)
            .with_context(|| format!("scanning {}", self.store.root.display()))?;
        let batch = EventBatch::created(sources);

        let engine = self.store.engine(&self.marker);
        let report = engine.process_batch(&batch).context("scan sync failed")?;

        if self.json {
            print_report_json(&report)?;
        } else {
            print_report(&report);
        }
        Ok(())
    }
}

/// Sorted list of every `*.{source_ext}` file under `root`.
fn collect_sources(root: &Path, source_ext: &str) -> Result<Vec<PathBuf>> {
    let mut dirs = vec![root.to_path_buf()];
    let mut sources = Vec::new();
    let mut cursor = 0;
    while cursor < dirs.len() {
        let current = dirs[cursor].clone();
        cursor += 1;
        let entries = std::fs::read_dir(&current)
            .with_context(|| format!("reading {}", current.display()))?;
        for entry in entries {
            let entry = entry.with_context(|| format!("reading {}", current.display()))?;
            let path = entry.path();
            if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                dirs.push(path);
            } else if path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.eq_ignore_ascii_case(source_ext))
                .unwrap_or(false)
            {
                sources.push(path);
            }
        }
    }
    sources.sort();
    Ok(sources)
}
