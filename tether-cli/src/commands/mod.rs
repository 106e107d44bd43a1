//! Subcommand implementations.

pub mod list;
pub mod scan;
pub mod sync;

use std::path::PathBuf;

use anyhow::{ensure, Result};
use clap::Args;
use colored::Colorize;

use tether_core::FsStore;
use tether_engine::{
    BatchReport, MarkerQualifier, SyncAction, SyncConfig, SyncEngine,
};

/// Arguments shared by every subcommand that opens a registry scope.
#[derive(Args, Debug)]
pub struct StoreArgs {
    /// Root directory of the watched tree.
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Extension of qualifying source files.
    #[arg(long, default_value = "src")]
    pub source_ext: String,

    /// Extension of artifact documents.
    #[arg(long, default_value = "art")]
    pub artifact_ext: String,
}

impl StoreArgs {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.root.is_dir(),
            "root is not a directory: {}",
            self.root.display()
        );
        ensure!(
            self.source_ext != self.artifact_ext,
            "source and artifact extensions must differ"
        );
        Ok(())
    }

    pub fn store(&self) -> FsStore {
        FsStore::new(&self.root, &self.artifact_ext)
    }

    pub fn engine(&self, marker: &str) -> SyncEngine<FsStore, MarkerQualifier> {
        SyncEngine::new(
            self.store(),
            MarkerQualifier::new(marker),
            SyncConfig {
                source_ext: self.source_ext.clone(),
                artifact_ext: self.artifact_ext.clone(),
            },
        )
    }
}

/// Print a batch report, one glyph-prefixed line per outcome.
pub fn print_report(report: &BatchReport) {
    if report.outcomes.is_empty() {
        println!("{} nothing to do", "✓".green());
        return;
    }

    println!(
        "{} {} created, {} relocated, {} skipped, {} warnings, {} failed",
        "✓".green(),
        report.created(),
        report.relocated(),
        report.skipped(),
        report.warnings(),
        report.failures(),
    );

    for outcome in &report.outcomes {
        let path = outcome.path.display();
        match &outcome.action {
            SyncAction::Created => println!("  {}  {path}", "✎".green()),
            SyncAction::Relocated { from } => {
                println!("  {}  {} → {path}", "⇢".cyan(), from.display())
            }
            SyncAction::Skipped { .. } => println!("  {}  {path}", "·".dimmed()),
            SyncAction::Warning { detail } => {
                println!("  {}  {path} — {detail}", "!".yellow())
            }
            SyncAction::Failed { detail } => {
                println!("  {}  {path} — {detail}", "✗".red())
            }
        }
    }
}

/// Dump a batch report as JSON for machine consumers.
pub fn print_report_json(report: &BatchReport) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}
