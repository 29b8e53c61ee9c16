// file: src/error.rs
// version: 1.0.0
// guid: 7c08d7c6-9298-4fb2-86a5-5d719aee9e81

//! Error types for the FreeSurfer BIDS app

use thiserror::Error;

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, BidsAppError>;

/// Error types for the FreeSurfer BIDS app
#[derive(Error, Debug)]
pub enum BidsAppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Command not found: {0}")]
    CommandNotFound(String),

    #[error(
        "Non zero return code: {} (command: {command})",
        .exit_code.map(|c| c.to_string()).unwrap_or_else(|| "terminated by signal".to_string())
    )]
    Process {
        command: String,
        exit_code: Option<i32>,
    },

    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

impl BidsAppError {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new process error
    pub fn process(command: impl Into<String>, exit_code: Option<i32>) -> Self {
        Self::Process {
            command: command.into(),
            exit_code,
        }
    }
}
