//! `vulntriage datasets` command handler

use std::io::Write;

use colored::Colorize;
use serde::Serialize;

use vulntriage_core::config::VulntriageConfig;
use vulntriage_core::types::Dataset;

use crate::error::CliError;
use crate::output::{OutputWriter, Render, fmt_timestamp, short_id};

/// Execute the `datasets` command.
pub async fn execute(config: &VulntriageConfig, writer: &OutputWriter) -> Result<(), CliError> {
    let store = super::open_store(config).await?;
    let datasets = store.list_datasets().await;
    let report = DatasetList::from_datasets(datasets);
    writer.render(&report)?;
    Ok(())
}

#[derive(Serialize)]
pub struct DatasetList {
    pub datasets: Vec<DatasetEntry>,
}

#[derive(Serialize)]
pub struct DatasetEntry {
    pub id: String,
    pub file_name: String,
    pub created_at: String,
    pub record_count: usize,
}

impl DatasetList {
    fn from_datasets(datasets: Vec<Dataset>) -> Self {
        Self {
            datasets: datasets
                .into_iter()
                .map(|d| DatasetEntry {
                    created_at: fmt_timestamp(d.created_at),
                    id: d.id,
                    file_name: d.file_name,
                    record_count: d.record_count,
                })
                .collect(),
        }
    }
}

impl Render for DatasetList {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        if self.datasets.is_empty() {
            writeln!(w, "{}", "No datasets imported yet.".dimmed())?;
            return Ok(());
        }

        writeln!(
            w,
            "{:<10} {:<40} {:<12} Records",
            "ID", "File", "Imported"
        )?;
        writeln!(w, "{}", "-".repeat(72))?;
        for entry in &self.datasets {
            writeln!(
                w,
                "{:<10} {:<40} {:<12} {}",
                short_id(&entry.id),
                entry.file_name,
                entry.created_at,
                entry.record_count
            )?;
        }
        writeln!(w)?;
        writeln!(w, "{} dataset(s)", self.datasets.len())?;

        Ok(())
    }
}
