//! Engine command-API errors.

use thiserror::Error;

use wf_zone::ZoneError;

/// Result type for command-API operations.
pub type CommandResult<T> = Result<T, CommandError>;

/// Validation errors returned synchronously to callers. A rejected command
/// leaves the engine state untouched.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Zone lookup or zone-level validation failed
    /// (unknown zone, material range, frost floor, temperature ladder).
    #[error(transparent)]
    Zone(#[from] ZoneError),

    /// A mode string could not be parsed.
    #[error("Invalid mode: {what}")]
    InvalidMode { what: String },

    /// Configuration could not be loaded or failed validation.
    #[error("Invalid configuration: {what}")]
    Config { what: String },

    /// Configuration file I/O failed.
    #[error("Config I/O: {0}")]
    ConfigIo(#[from] std::io::Error),

    /// Configuration YAML was malformed.
    #[error("Config parse: {0}")]
    ConfigParse(#[from] serde_yaml::Error),
}
