//! Error types for `arrowgrid`
//!
//! Construction-time configuration failures are the only real errors the
//! trial core can produce. Grid depletion and stale timer ticks are normal
//! operation and never surface here.

use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for `arrowgrid` CLI operations.
///
/// These codes follow Unix conventions.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// General error
    pub const ERROR: i32 = 1;

    /// Configuration error (invalid YAML, validation failure)
    pub const CONFIG_ERROR: i32 = 2;

    /// I/O error (file not found, permission denied)
    pub const IO_ERROR: i32 = 3;

    /// Usage error (invalid arguments, missing required options)
    pub const USAGE_ERROR: i32 = 64;

    /// Interrupted by SIGINT (Ctrl+C)
    pub const INTERRUPTED: i32 = 130;

    /// Terminated by SIGTERM
    pub const TERMINATED: i32 = 143;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `arrowgrid` operations.
///
/// Aggregates the domain errors and maps each one to a process exit code.
#[derive(Debug, Error)]
pub enum ArrowGridError {
    /// Configuration loading or validation error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Session driver error
    #[error(transparent)]
    Session(#[from] SessionError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ArrowGridError {
    /// Returns the appropriate exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Json(_) | Self::Yaml(_) => ExitCode::CONFIG_ERROR,
            Self::Session(_) => ExitCode::ERROR,
            Self::Io(_) => ExitCode::IO_ERROR,
        }
    }
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Configuration loading and validation errors.
///
/// A trial cannot be constructed from a configuration that produced any of
/// these; there is no recovery path.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML parsing failed
    #[error("parse error in {path}: {message}")]
    ParseError {
        /// Path to the configuration file
        path: PathBuf,
        /// Line number where the error occurred (if available)
        line: Option<usize>,
        /// Error message from the parser
        message: String,
    },

    /// Configuration validation failed
    #[error("validation failed for {path}: {}", summarize(errors))]
    ValidationError {
        /// Path to the configuration file, or `<inline>` for programmatic configs
        path: String,
        /// List of validation issues found
        errors: Vec<ValidationIssue>,
    },

    /// Referenced configuration file not found
    #[error("file not found: {path}")]
    MissingFile {
        /// Path to the missing file
        path: PathBuf,
    },

    /// Configuration file exceeds the size limit
    #[error("config file {path} is {size} bytes (limit: {limit})")]
    FileTooLarge {
        /// Path to the configuration file
        path: PathBuf,
        /// Actual file size in bytes
        size: u64,
        /// Configured size limit in bytes
        limit: u64,
    },

    /// Field has an invalid value
    #[error("invalid value for '{field}': got '{value}', expected {expected}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The actual value provided
        value: String,
        /// Description of what was expected
        expected: String,
    },

    /// Environment variable referenced in configuration is not set
    #[error("environment variable '{var}' not set (referenced at {location})")]
    EnvVarNotSet {
        /// Name of the environment variable
        var: String,
        /// Location in the configuration where it was referenced
        location: String,
    },
}

fn summarize(errors: &[ValidationIssue]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// ============================================================================
// Validation Types
// ============================================================================

/// A single validation issue found during configuration validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Path to the problematic field (e.g., "`left_probability`")
    pub path: String,
    /// Description of the validation issue
    pub message: String,
    /// Severity level of the issue
    pub severity: Severity,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {} at {}", prefix, self.message, self.path)
    }
}

/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Error - validation failure that prevents the configuration from being used
    Error,
    /// Warning - potential issue that does not prevent a trial from running
    Warning,
}

// ============================================================================
// Session Errors
// ============================================================================

/// Errors raised by the async session driver.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The session event queue was closed while a handle still tried to use it
    #[error("session queue closed")]
    QueueClosed,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(path: &str, message: &str) -> ValidationIssue {
        ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Error,
        }
    }

    #[test]
    fn config_errors_map_to_config_exit_code() {
        let err = ArrowGridError::from(ConfigError::MissingFile {
            path: PathBuf::from("trial.yaml"),
        });
        assert_eq!(err.exit_code(), ExitCode::CONFIG_ERROR);
    }

    #[test]
    fn io_errors_map_to_io_exit_code() {
        let err = ArrowGridError::from(std::io::Error::other("boom"));
        assert_eq!(err.exit_code(), ExitCode::IO_ERROR);
    }

    #[test]
    fn session_errors_map_to_general_exit_code() {
        let err = ArrowGridError::from(SessionError::QueueClosed);
        assert_eq!(err.exit_code(), ExitCode::ERROR);
    }

    #[test]
    fn validation_error_lists_every_issue() {
        let err = ConfigError::ValidationError {
            path: "<inline>".to_string(),
            errors: vec![
                issue("grid_size", "must be at least 1"),
                issue("duration_frames", "must be at least 1"),
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("grid_size"));
        assert!(msg.contains("duration_frames"));
    }

    #[test]
    fn issue_display_includes_severity_prefix() {
        let warning = ValidationIssue {
            severity: Severity::Warning,
            ..issue("grid_size", "unusually large")
        };
        assert_eq!(warning.to_string(), "warning: unusually large at grid_size");
        assert_eq!(
            issue("x", "bad").to_string(),
            "error: bad at x"
        );
    }
}
