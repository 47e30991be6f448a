use castaway_catalog::TribeNameError;
use castaway_db::{OperationError, SchemaError};
use thiserror::Error;

use crate::messages;

/// Errors that can occur during CLI command execution.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// I/O error
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// The database could not be opened or set up
    #[error("Database error: {0}")]
    Database(#[from] SchemaError),

    /// A lookup or mutation failed; the message depends on the cause
    #[error("{}", messages::describe(.0))]
    Operation(#[from] OperationError),

    /// Malformed tribe display string
    #[error("Invalid tribe: {0}")]
    Tribe(#[from] TribeNameError),

    /// Colour argument that is not six hex digits
    #[error("Invalid colour '{0}': expected six hex digits such as d3d3d3")]
    InvalidColor(String),

    /// A command needed a season but none was given or active
    #[error("No season selected: pass --server or activate a season first")]
    NoSeason,

    /// Command arguments that do not select anything
    #[error("{0}")]
    Usage(String),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// JSON output error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    pub(crate) fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
