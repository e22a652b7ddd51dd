use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the unload pipeline.
#[derive(Error, Debug)]
pub enum UnloadError {
    /// The export artifact never appeared before the attempt limit.
    #[error("Export for {period} not available after {attempts} attempts")]
    ExportUnavailable { period: String, attempts: u32 },

    /// A measure field could not be parsed as a decimal number.
    #[error("Malformed {field} value: {value:?}")]
    MalformedMeasure { field: &'static str, value: String },

    /// A classification code is not 9 or 10 digits.
    #[error("Invalid classification code: {0:?}")]
    InvalidClassificationCode(String),

    /// A direction string is not one of the two recognised codes.
    #[error("Unknown direction code: {0:?}")]
    UnknownDirection(String),

    /// A period or period-selection string could not be parsed.
    #[error("Invalid period selection: {0}")]
    PeriodParse(String),

    /// The external export agent failed to run or reported failure.
    #[error("Export agent failure: {0}")]
    Agent(String),

    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The master store could not be created or appended to.
    #[error("Failed to write master store {path}: {source}")]
    StoreWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A delimited file could not be parsed.
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the unload crates.
pub type Result<T> = std::result::Result<T, UnloadError>;
