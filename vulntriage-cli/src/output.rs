//! Output formatting abstraction for text vs JSON rendering
//!
//! All subcommand output flows through [`OutputWriter`] which handles
//! format switching. This keeps format-specific logic out of command
//! handlers entirely.

use std::io::Write;
use std::time::SystemTime;

use colored::{ColoredString, Colorize};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Abstraction for writing CLI output in different formats.
///
/// Subcommand handlers call `writer.render(&payload)` where `payload`
/// implements both `Serialize` (for JSON) and `Render` (for text).
pub struct OutputWriter {
    format: OutputFormat,
}

impl OutputWriter {
    /// Create a new output writer with the specified format.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Render a payload to stdout.
    ///
    /// For `Text` format, delegates to `Render::render_text()`.
    /// For `Json` format, serialises via `serde_json`.
    pub fn render<T: Render + Serialize>(&self, payload: &T) -> Result<(), CliError> {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        match self.format {
            OutputFormat::Text => {
                payload.render_text(&mut handle)?;
            }
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut handle, payload)?;
                writeln!(handle)?;
            }
        }
        Ok(())
    }
}

/// Trait for human-readable text rendering.
///
/// Implemented by every CLI output payload alongside `serde::Serialize`.
pub trait Render {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()>;
}

/// Colorize a severity label for table output.
pub fn severity_cell(severity: &str) -> ColoredString {
    match severity {
        "Critical" => severity.red().bold(),
        "High" => severity.red(),
        "Medium" => severity.yellow(),
        "Low" => severity.normal(),
        "Info" => severity.dimmed(),
        "Unknown" => severity.cyan(),
        _ => severity.normal(),
    }
}

/// Format a timestamp as Unix epoch seconds for table output.
pub fn fmt_timestamp(time: SystemTime) -> String {
    match time.duration_since(SystemTime::UNIX_EPOCH) {
        Ok(duration) => duration.as_secs().to_string(),
        Err(_) => "unknown".to_owned(),
    }
}

/// Shorten a UUID-style identifier for table output.
pub fn short_id(id: &str) -> &str {
    &id[..8.min(id.len())]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct TestPayload {
        name: String,
        count: u32,
    }

    impl Render for TestPayload {
        fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
            writeln!(w, "Name: {}", self.name)?;
            writeln!(w, "Count: {}", self.count)?;
            Ok(())
        }
    }

    #[test]
    fn text_rendering_writes_fields() {
        let payload = TestPayload {
            name: "scan.csv".to_owned(),
            count: 42,
        };

        let mut buffer = Vec::new();
        payload.render_text(&mut buffer).unwrap();
        let output = String::from_utf8(buffer).unwrap();
        assert!(output.contains("Name: scan.csv"));
        assert!(output.contains("Count: 42"));
    }

    #[test]
    fn json_serialization_roundtrips() {
        let payload = TestPayload {
            name: "scan.csv".to_owned(),
            count: 7,
        };
        let json = serde_json::to_string(&payload).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["name"].as_str(), Some("scan.csv"));
        assert_eq!(parsed["count"].as_u64(), Some(7));
    }

    #[test]
    fn fmt_timestamp_epoch_is_zero() {
        assert_eq!(fmt_timestamp(SystemTime::UNIX_EPOCH), "0");
    }

    #[test]
    fn short_id_truncates_uuids() {
        assert_eq!(short_id("abcdef12-3456-7890-abcd-ef1234567890"), "abcdef12");
        assert_eq!(short_id("abc"), "abc");
    }

    #[test]
    fn severity_cell_covers_vocabulary() {
        // 색상 적용 여부와 무관하게 라벨 텍스트는 보존되어야 함
        for label in ["Critical", "High", "Medium", "Low", "Info", "Unknown"] {
            let cell = severity_cell(label);
            assert!(cell.to_string().contains(label));
        }
    }
}
