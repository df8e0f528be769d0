//! `vulntriage records` command handler

use std::io::Write;

use colored::Colorize;
use serde::Serialize;

use vulntriage_core::config::VulntriageConfig;
use vulntriage_core::types::VulnerabilityRecord;

use crate::cli::RecordsArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render, severity_cell, short_id};

/// Execute the `records` command.
pub async fn execute(
    args: RecordsArgs,
    config: &VulntriageConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let store = super::open_store(config).await?;
    let records = store.list_records(&args.dataset_id).await?;
    let report = RecordList::from_records(args.dataset_id, records);
    writer.render(&report)?;
    Ok(())
}

#[derive(Serialize)]
pub struct RecordList {
    pub dataset_id: String,
    pub records: Vec<RecordEntry>,
}

#[derive(Serialize)]
pub struct RecordEntry {
    pub id: String,
    pub cve_id: String,
    pub product: String,
    pub component: String,
    pub original_severity: String,
    pub effective_severity: String,
    pub score: Option<f64>,
    pub assessed: bool,
}

impl RecordList {
    fn from_records(dataset_id: String, records: Vec<VulnerabilityRecord>) -> Self {
        Self {
            dataset_id,
            records: records
                .into_iter()
                .map(|r| RecordEntry {
                    original_severity: r.original.severity.to_string(),
                    effective_severity: r.effective_severity().to_string(),
                    score: r.effective_score(),
                    assessed: r.has_expert_assessment(),
                    id: r.id,
                    cve_id: r.cve_id,
                    product: r.product,
                    component: r.component,
                })
                .collect(),
        }
    }
}

impl Render for RecordList {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        if self.records.is_empty() {
            writeln!(w, "{}", "Dataset has no records.".dimmed())?;
            return Ok(());
        }

        writeln!(
            w,
            "{:<10} {:<18} {:<24} {:<18} {:<10} {:<6} Assessed",
            "ID", "CVE", "Product", "Component", "Severity", "Score"
        )?;
        writeln!(w, "{}", "-".repeat(96))?;

        for entry in &self.records {
            let score = entry
                .score
                .map(|s| format!("{s:.1}"))
                .unwrap_or_else(|| "-".to_owned());
            let assessed = if entry.assessed { "yes".green() } else { "".normal() };
            writeln!(
                w,
                "{:<10} {:<18} {:<24} {:<18} {:<10} {:<6} {}",
                short_id(&entry.id),
                entry.cve_id,
                entry.product,
                if entry.component.is_empty() { "-" } else { &entry.component },
                severity_cell(&entry.effective_severity),
                score,
                assessed
            )?;
        }
        writeln!(w)?;
        writeln!(w, "{} record(s)", self.records.len())?;

        Ok(())
    }
}
