//! # CLI Error Type
//!
//! Unified error type for every command.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in billsplit                              │
//! │                                                                         │
//! │  ValidationError ──► CoreError ──┐                                     │
//! │                                  ├──► CliError ──► ErrorCode           │
//! │  csv / io errors ──► IoError ────┘        │            │               │
//! │                                           ▼            ▼               │
//! │                                 stderr message    exit status          │
//! │                                 (text or JSON)                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! With `--format json` the error is printed as
//! ```json
//! { "code": "NOT_FOUND", "message": "Participant not found: Zed" }
//! ```

use billsplit_core::CoreError;
use billsplit_io::IoError;
use serde::Serialize;
use thiserror::Error;

/// Machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Unknown participant, category or item
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Name already taken
    Duplicate,

    /// Nothing to undo or redo
    EmptyHistory,

    /// File could not be read or written
    IoError,

    /// Configuration could not be loaded
    ConfigError,

    /// A script line could not be parsed
    ScriptError,
}

impl ErrorCode {
    /// Process exit status for this code.
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorCode::ConfigError => 1,
            ErrorCode::ValidationError => 2,
            ErrorCode::NotFound => 3,
            ErrorCode::Duplicate => 4,
            ErrorCode::EmptyHistory => 5,
            ErrorCode::IoError => 6,
            ErrorCode::ScriptError => 7,
        }
    }
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Domain error from the bill
    #[error("{0}")]
    Core(#[from] CoreError),

    /// File adapter error
    #[error("{0}")]
    Io(#[from] IoError),

    /// File I/O error outside the adapters
    #[error("File I/O error: {0}")]
    File(#[from] std::io::Error),

    /// JSON output error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Invalid argument
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Unparseable script line
    #[error("Line {line}: {message}")]
    Syntax { line: usize, message: String },

    /// A script command failed
    #[error("Line {line}: {source}")]
    Script {
        line: usize,
        #[source]
        source: Box<CliError>,
    },

    /// Lines failed under `--keep-going`
    #[error("{failed} script line(s) failed")]
    ScriptFailed { failed: usize, first_code: ErrorCode },
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        CliError::Config {
            message: message.into(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_arg(message: impl Into<String>) -> Self {
        CliError::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a script syntax error
    pub fn syntax(line: usize, message: impl Into<String>) -> Self {
        CliError::Syntax {
            line,
            message: message.into(),
        }
    }

    /// Attaches a script line number
    pub fn at_line(self, line: usize) -> Self {
        match self {
            CliError::Syntax { .. } | CliError::Script { .. } | CliError::ScriptFailed { .. } => self,
            other => CliError::Script {
                line,
                source: Box::new(other),
            },
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            CliError::Core(err) => core_code(err),
            CliError::Io(IoError::Ingest { source, .. }) => core_code(source),
            CliError::Io(IoError::InvalidRow { .. }) | CliError::Io(IoError::MissingColumn { .. }) => {
                ErrorCode::ValidationError
            }
            CliError::Io(_) | CliError::File(_) | CliError::Json(_) => ErrorCode::IoError,
            CliError::Config { .. } => ErrorCode::ConfigError,
            CliError::InvalidArgument { .. } => ErrorCode::ValidationError,
            CliError::Syntax { .. } => ErrorCode::ScriptError,
            CliError::Script { source, .. } => source.code(),
            CliError::ScriptFailed { first_code, .. } => *first_code,
        }
    }

    /// Get exit code for this error
    pub fn exit_code(&self) -> i32 {
        self.code().exit_code()
    }

    /// Serializable form for JSON output.
    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            code: self.code(),
            message: self.to_string(),
        }
    }
}

fn core_code(err: &CoreError) -> ErrorCode {
    match err {
        CoreError::NotFound { .. } => ErrorCode::NotFound,
        CoreError::Duplicate { .. } => ErrorCode::Duplicate,
        CoreError::EmptyHistory { .. } => ErrorCode::EmptyHistory,
        CoreError::Validation(_) => ErrorCode::ValidationError,
    }
}

/// What JSON consumers receive when a command fails.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    pub code: ErrorCode,
    pub message: String,
}
