//! CLI-specific error types and exit code mapping

use vulntriage_core::error::VulntriageError;
use vulntriage_ingest::IngestError;
use vulntriage_store::StoreError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to stable process exit codes so
/// scripts wrapping the CLI can distinguish failure classes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// Import failed at the file level (format, readability, limits).
    #[error("import error: {0}")]
    Import(String),

    /// A referenced dataset or record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// An expert assessment was rejected by validation.
    #[error("validation error: {0}")]
    Validation(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                         |
    /// |------|---------------------------------|
    /// | 0    | Success                         |
    /// | 1    | General / command error          |
    /// | 2    | Configuration error              |
    /// | 3    | Dataset or record not found      |
    /// | 4    | Assessment validation rejected   |
    /// | 5    | Import failed                    |
    /// | 10   | IO error                         |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::NotFound(_) => 3,
            Self::Validation(_) => 4,
            Self::Import(_) => 5,
            Self::Io(_) => 10,
            Self::JsonSerialize(_) | Self::Command(_) => 1,
        }
    }
}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        let message = e.to_string();
        match e {
            StoreError::DatasetNotFound { .. } | StoreError::RecordNotFound { .. } => {
                Self::NotFound(message)
            }
            StoreError::Assessment(_) => Self::Validation(message),
            StoreError::ImportFailed { .. } => Self::Import(message),
            StoreError::Snapshot { .. } => Self::Command(message),
        }
    }
}

impl From<IngestError> for CliError {
    fn from(e: IngestError) -> Self {
        match e {
            IngestError::Store(inner) => inner.into(),
            IngestError::UnsupportedFormat { .. }
            | IngestError::UnreadableFile { .. }
            | IngestError::FileTooBig { .. }
            | IngestError::TooManyRowErrors { .. }
            | IngestError::TooManyRecords { .. } => Self::Import(e.to_string()),
            IngestError::Config { .. } => Self::Config(e.to_string()),
            other => Self::Command(other.to_string()),
        }
    }
}

impl From<VulntriageError> for CliError {
    fn from(e: VulntriageError) -> Self {
        match e {
            VulntriageError::Config(inner) => Self::Config(inner.to_string()),
            VulntriageError::Import(inner) => Self::Import(inner.to_string()),
            VulntriageError::Storage(inner) => Self::NotFound(inner.to_string()),
            VulntriageError::Assessment(inner) => Self::Validation(inner.to_string()),
            VulntriageError::Io(inner) => Self::Io(inner),
        }
    }
}
