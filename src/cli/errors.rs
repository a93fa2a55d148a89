//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero exit code. Failures of
//! the core keep their own stable code.

use std::fmt;
use std::io;

use crate::config::ConfigError;
use crate::observability::ObservabilityError;
use crate::store::StoreError;
use crate::tracker::TrackerError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (stdin/stdout)
    IoError,
    /// Malformed request on stdin
    InvalidRequest,
    /// Already initialized
    AlreadyInitialized,
    /// Not initialized
    NotInitialized,
    /// Logging could not be set up
    LoggingFailed,
    /// Hash chain verification found tampering
    ChainTampered,
    /// A core operation failed; carries that failure's code
    Operation(&'static str),
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "NC_CLI_CONFIG_ERROR",
            Self::IoError => "NC_CLI_IO_ERROR",
            Self::InvalidRequest => "NC_CLI_INVALID_REQUEST",
            Self::AlreadyInitialized => "NC_CLI_ALREADY_INITIALIZED",
            Self::NotInitialized => "NC_CLI_NOT_INITIALIZED",
            Self::LoggingFailed => "NC_CLI_LOGGING_FAILED",
            Self::ChainTampered => "NC_CLI_CHAIN_TAMPERED",
            Self::Operation(code) => code,
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::InvalidRequest, msg)
    }

    pub fn already_initialized() -> Self {
        Self::new(
            CliErrorCode::AlreadyInitialized,
            "Data directory already initialized",
        )
    }

    pub fn not_initialized() -> Self {
        Self::new(
            CliErrorCode::NotInitialized,
            "Data directory not initialized. Run 'neurochain init' first.",
        )
    }

    pub fn chain_tampered(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ChainTampered, msg)
    }

    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::invalid_request(format!("JSON error: {}", e))
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::config_error(e.to_string())
    }
}

impl From<ObservabilityError> for CliError {
    fn from(e: ObservabilityError) -> Self {
        Self::new(CliErrorCode::LoggingFailed, e.to_string())
    }
}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        Self::new(CliErrorCode::Operation(e.code()), e.to_string())
    }
}

impl From<TrackerError> for CliError {
    fn from(e: TrackerError) -> Self {
        Self::new(CliErrorCode::Operation(e.code()), e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
