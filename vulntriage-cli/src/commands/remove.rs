//! `vulntriage remove` command handler

use std::io::Write;

use colored::Colorize;
use serde::Serialize;

use vulntriage_core::config::VulntriageConfig;

use crate::cli::RemoveArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `remove` command.
pub async fn execute(
    args: RemoveArgs,
    config: &VulntriageConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let store = super::open_store(config).await?;
    let dataset = store.remove_dataset(&args.dataset_id).await?;

    let report = RemoveReport {
        dataset_id: dataset.id,
        file_name: dataset.file_name,
        record_count: dataset.record_count,
    };
    writer.render(&report)?;
    Ok(())
}

#[derive(Serialize)]
pub struct RemoveReport {
    pub dataset_id: String,
    pub file_name: String,
    pub record_count: usize,
}

impl Render for RemoveReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(
            w,
            "Removed dataset {} ({}, {} records)",
            self.dataset_id.bold(),
            self.file_name,
            self.record_count
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_text_names_the_dataset() {
        let report = RemoveReport {
            dataset_id: "ds-1".to_owned(),
            file_name: "scan.csv".to_owned(),
            record_count: 12,
        };
        let mut buffer = Vec::new();
        report.render_text(&mut buffer).unwrap();
        let output = String::from_utf8(buffer).unwrap();
        assert!(output.contains("ds-1"));
        assert!(output.contains("scan.csv"));
        assert!(output.contains("12"));
    }
}
