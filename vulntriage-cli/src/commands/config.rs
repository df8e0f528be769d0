//! `vulntriage config` command handler

use std::io::Write;
use std::path::Path;

use colored::Colorize;
use serde::Serialize;

use vulntriage_core::config::VulntriageConfig;

use crate::cli::{ConfigAction, ConfigArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `config` command.
pub async fn execute(
    args: ConfigArgs,
    config: &VulntriageConfig,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Show => {
            let toml = toml::to_string_pretty(config)
                .map_err(|e| CliError::Command(format!("cannot render config: {e}")))?;
            writer.render(&ConfigShowReport {
                path: config_path.display().to_string(),
                toml,
            })?;
        }
        ConfigAction::Validate => {
            // show와 달리 파일이 실제로 존재하고 파싱/검증을 통과해야 함
            VulntriageConfig::load(config_path)
                .await
                .map_err(|e| CliError::Config(e.to_string()))?;
            writer.render(&ConfigValidateReport {
                path: config_path.display().to_string(),
                valid: true,
            })?;
        }
    }
    Ok(())
}

#[derive(Serialize)]
pub struct ConfigShowReport {
    pub path: String,
    pub toml: String,
}

impl Render for ConfigShowReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "# effective configuration ({})", self.path)?;
        writeln!(w, "{}", self.toml)?;
        Ok(())
    }
}

#[derive(Serialize)]
pub struct ConfigValidateReport {
    pub path: String,
    pub valid: bool,
}

impl Render for ConfigValidateReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "{}: {}", self.path, "valid".green().bold())?;
        Ok(())
    }
}
