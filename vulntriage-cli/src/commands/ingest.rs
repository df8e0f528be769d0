//! `vulntriage ingest` command handler

use std::io::Write;
use std::sync::Arc;

use colored::Colorize;
use serde::Serialize;

use vulntriage_core::config::VulntriageConfig;
use vulntriage_core::types::ImportSummary;
use vulntriage_ingest::{ImporterBuilder, ImporterConfig};

use crate::cli::IngestArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `ingest` command.
pub async fn execute(
    args: IngestArgs,
    config: &VulntriageConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let store = super::open_store(config).await?;

    let (importer, _event_rx) = ImporterBuilder::new()
        .store(Arc::clone(&store))
        .config(ImporterConfig::from_core(&config.ingest))
        .build()?;

    let summary = importer.ingest(&args.file).await?;
    let report = IngestReport::from_summary(summary);
    writer.render(&report)?;

    Ok(())
}

#[derive(Serialize)]
pub struct IngestReport {
    pub dataset_id: String,
    pub file_name: String,
    pub record_count: usize,
    pub skipped_row_count: usize,
    pub unknown_severity_count: usize,
    pub row_errors: Vec<String>,
}

impl IngestReport {
    fn from_summary(summary: ImportSummary) -> Self {
        Self {
            dataset_id: summary.dataset_id,
            file_name: summary.file_name,
            record_count: summary.record_count,
            skipped_row_count: summary.skipped_row_count,
            unknown_severity_count: summary.unknown_severity_count,
            row_errors: summary.row_errors.iter().map(ToString::to_string).collect(),
        }
    }
}

impl Render for IngestReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "Imported: {}", self.file_name.bold())?;
        writeln!(w, "Dataset:  {}", self.dataset_id)?;
        writeln!(
            w,
            "Records:  {}",
            self.record_count.to_string().green().bold()
        )?;

        if self.skipped_row_count > 0 {
            writeln!(
                w,
                "Skipped:  {}",
                self.skipped_row_count.to_string().yellow().bold()
            )?;
        } else {
            writeln!(w, "Skipped:  0")?;
        }

        if self.unknown_severity_count > 0 {
            writeln!(
                w,
                "Unknown severity: {}",
                self.unknown_severity_count.to_string().cyan()
            )?;
        }

        if !self.row_errors.is_empty() {
            writeln!(w)?;
            writeln!(w, "Row errors:")?;
            for error in &self.row_errors {
                writeln!(w, "  {error}")?;
            }
            if self.row_errors.len() < self.skipped_row_count {
                writeln!(
                    w,
                    "  ... and {} more",
                    self.skipped_row_count - self.row_errors.len()
                )?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> IngestReport {
        IngestReport {
            dataset_id: "ds-001".to_owned(),
            file_name: "scan.csv".to_owned(),
            record_count: 100,
            skipped_row_count: 5,
            unknown_severity_count: 2,
            row_errors: vec!["row 3: field 'cve_id': required field is missing or empty".to_owned()],
        }
    }

    #[test]
    fn report_text_contains_counts() {
        let mut buffer = Vec::new();
        sample_report().render_text(&mut buffer).unwrap();
        let output = String::from_utf8(buffer).unwrap();
        assert!(output.contains("scan.csv"));
        assert!(output.contains("100"));
        assert!(output.contains("5"));
        assert!(output.contains("row 3"));
        assert!(output.contains("and 4 more"));
    }

    #[test]
    fn report_json_shape() {
        let json = serde_json::to_value(sample_report()).unwrap();
        assert_eq!(json["record_count"].as_u64(), Some(100));
        assert_eq!(json["skipped_row_count"].as_u64(), Some(5));
        assert_eq!(json["unknown_severity_count"].as_u64(), Some(2));
    }
}
