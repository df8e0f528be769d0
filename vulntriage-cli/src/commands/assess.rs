//! `vulntriage assess` command handler

use std::io::Write;

use colored::Colorize;
use serde::Serialize;

use vulntriage_core::config::VulntriageConfig;
use vulntriage_core::types::VulnerabilityRecord;
use vulntriage_store::ExpertUpdate;

use crate::cli::AssessArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render, fmt_timestamp, severity_cell};

/// Execute the `assess` command.
pub async fn execute(
    args: AssessArgs,
    config: &VulntriageConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let store = super::open_store(config).await?;

    let update = ExpertUpdate {
        record_id: args.record_id,
        severity: args.severity,
        vector: args.vector,
        score: args.score,
        justification: args.justification,
    };

    let record = store.apply_expert_update(update).await?;
    let report = AssessReport::from_record(record);
    writer.render(&report)?;

    Ok(())
}

#[derive(Serialize)]
pub struct AssessReport {
    pub record_id: String,
    pub cve_id: String,
    pub product: String,
    pub original_severity: String,
    pub original_score: Option<f64>,
    pub expert_severity: Option<String>,
    pub expert_vector: Option<String>,
    pub expert_score: Option<f64>,
    pub justification: Option<String>,
    pub updated_at: Option<String>,
}

impl AssessReport {
    fn from_record(record: VulnerabilityRecord) -> Self {
        Self {
            record_id: record.id,
            cve_id: record.cve_id,
            product: record.product,
            original_severity: record.original.severity.to_string(),
            original_score: record.original.score,
            expert_severity: record.expert.severity.map(|s| s.to_string()),
            expert_vector: record.expert.vector,
            expert_score: record.expert.score,
            justification: record.expert.justification,
            updated_at: record.expert.updated_at.map(fmt_timestamp),
        }
    }
}

impl Render for AssessReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "{}", "Assessment saved.".green().bold())?;
        writeln!(w)?;
        writeln!(w, "Record:   {} ({})", self.cve_id.bold(), self.record_id)?;
        writeln!(w, "Product:  {}", self.product)?;
        writeln!(
            w,
            "Original: {} (score: {})",
            severity_cell(&self.original_severity),
            self.original_score
                .map(|s| format!("{s:.1}"))
                .unwrap_or_else(|| "-".to_owned())
        )?;

        let expert_severity = self.expert_severity.as_deref().unwrap_or("-");
        writeln!(
            w,
            "Expert:   {} (score: {}, vector: {})",
            severity_cell(expert_severity),
            self.expert_score
                .map(|s| format!("{s:.1}"))
                .unwrap_or_else(|| "-".to_owned()),
            self.expert_vector.as_deref().unwrap_or("-")
        )?;

        if let Some(justification) = &self.justification {
            writeln!(w, "Why:      {justification}")?;
        }
        if let Some(updated_at) = &self.updated_at {
            writeln!(w, "Updated:  {updated_at}")?;
        }

        Ok(())
    }
}
