//! `tether list` — table of registered artifacts and their links.

use anyhow::{Context, Result};
use clap::Args;
use tabled::{Table, Tabled};

use tether_core::Artifact;

use super::StoreArgs;

/// Arguments for `tether list`.
#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Tabled)]
struct ArtifactRow {
    #[tabled(rename = "Artifact")]
    path: String,
    #[tabled(rename = "Id")]
    id: String,
    #[tabled(rename = "Link")]
    link: String,
    #[tabled(rename = "Updated")]
    updated: String,
}

impl ArtifactRow {
    fn new(path: &std::path::Path, artifact: &Artifact) -> Self {
        Self {
            path: path.display().to_string(),
            id: artifact.id.to_string(),
            link: artifact
                .link
                .as_ref()
                .map(|h| short_digest(&h.0))
                .unwrap_or_else(|| "(unlinked)".to_string()),
            updated: artifact.updated_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

fn short_digest(hex: &str) -> String {
    hex.chars().take(12).collect()
}

impl ListArgs {
    pub fn run(self) -> Result<()> {
        self.store.validate()?;
        let artifacts = self
            .store
            .store()
            .enumerate()
            .context("enumerating artifacts")?;

        if artifacts.is_empty() {
            println!("No artifacts under {}", self.store.root.display());
            return Ok(());
        }

        let rows: Vec<ArtifactRow> = artifacts
            .iter()
            .map(|(path, artifact)| ArtifactRow::new(path, artifact))
            .collect();
        println!("{}", Table::new(rows));
        Ok(())
    }
}
