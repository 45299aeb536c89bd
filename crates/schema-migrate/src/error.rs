//! Error types for the migration library.

use thiserror::Error;

/// Exit code for configuration errors.
pub const EXIT_CONFIG_ERROR: u8 = 1;

/// Exit code for anything not covered by a more specific code.
pub const EXIT_FAILURE: u8 = 2;

/// Exit code for file system errors.
pub const EXIT_IO_ERROR: u8 = 7;

/// Main error type for migration operations.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Configuration error (invalid YAML, missing fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// No dialect is registered under the requested name
    #[error("Unknown database dialect: {0}")]
    UnknownDialect(String),

    /// The text generator failed or returned nothing usable
    #[error("Text generation failed: {0}")]
    Generation(String),

    /// A migration plan is malformed or does not match the schema
    #[error("Invalid migration plan: {0}")]
    Plan(String),

    /// The external migration runner reported an error
    #[error("Migration runner error: {0}")]
    Runner(String),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MigrateError {
    /// Create a Generation error
    pub fn generation(message: impl Into<String>) -> Self {
        MigrateError::Generation(message.into())
    }

    /// Create a Plan error
    pub fn plan(message: impl Into<String>) -> Self {
        MigrateError::Plan(message.into())
    }

    /// Map the error to a process exit code.
    pub fn exit_code(&self) -> u8 {
        match self {
            MigrateError::Config(_) | MigrateError::UnknownDialect(_) | MigrateError::Yaml(_) => {
                EXIT_CONFIG_ERROR
            }
            MigrateError::Io(_) => EXIT_IO_ERROR,
            _ => EXIT_FAILURE,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;
