//! Error types.
//!
//! - `AppError` is what the binary reports: a message plus a process exit code.
//! - `DataError`, `LookupError` and `IngestError` are the typed failures of the
//!   builder/loader, the resolver and the observation log respectively. Each
//!   converts into `AppError` so `?` works all the way up to `app::run`.

use std::path::PathBuf;

use thiserror::Error;

/// Exit code for fatal failures (bad input files, missing columns, I/O).
pub const EXIT_FAILURE: u8 = 1;

/// Exit code for `shipcost lookup` when at least one SKU could not be resolved.
pub const EXIT_LOOKUP_FAILED: u8 = 3;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Fatal problems with input files or the bracket configuration.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("ERROR: No input files found matching: {}", .patterns.join(", "))]
    NoInput { patterns: Vec<String> },

    #[error("ERROR: Missing columns in {}: {}", .path.display(), .missing.join(", "))]
    Schema { path: PathBuf, missing: Vec<String> },

    #[error("ERROR: Unknown weight bracket '{label}' in {} (built with different brackets?)", .path.display())]
    UnknownBracket { path: PathBuf, label: String },

    #[error("ERROR: Invalid value '{value}' in {}, line {line}, column `{column}`", .path.display())]
    InvalidCell {
        path: PathBuf,
        line: usize,
        column: String,
        value: String,
    },

    #[error("ERROR: Invalid input pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("ERROR: Invalid weight brackets: {0}")]
    InvalidBrackets(String),

    #[error("ERROR: Required file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("ERROR: I/O failure on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("ERROR: Failed to parse CSV '{}': {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Recoverable per-request lookup failures. The `Display` text is shown to the user.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LookupError {
    #[error("SKU '{sku}' not found in the weight table.")]
    UnknownSku { sku: String },

    #[error("Weight {weight} lb for SKU '{sku}' falls outside defined brackets.")]
    OutOfRange { sku: String, weight: f64 },

    #[error("No shipping cost data for the {label} bracket (weight {weight} lb, SKU '{sku}').")]
    NoData {
        sku: String,
        weight: f64,
        label: String,
    },
}

/// Failures while appending to the observations log.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("SKU and cost are required.")]
    MissingField,

    #[error("Invalid cost value '{0}'.")]
    InvalidValue(String),

    #[error("Please upload a .csv file (got {}).", .0.display())]
    NotCsv(PathBuf),

    #[error(transparent)]
    Data(#[from] DataError),
}

impl From<DataError> for AppError {
    fn from(err: DataError) -> Self {
        AppError::new(EXIT_FAILURE, err.to_string())
    }
}

impl From<IngestError> for AppError {
    fn from(err: IngestError) -> Self {
        AppError::new(EXIT_FAILURE, err.to_string())
    }
}

impl From<LookupError> for AppError {
    fn from(err: LookupError) -> Self {
        AppError::new(EXIT_LOOKUP_FAILED, err.to_string())
    }
}
