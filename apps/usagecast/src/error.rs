//! # Application Errors
//!
//! Wraps engine errors together with the I/O, JSON and configuration
//! failures that only exist at the application boundary.

use thiserror::Error;
use usagecast_core::UsageError;

/// Errors surfaced by the usagecast binary.
#[derive(Debug, Error)]
pub enum AppError {
    /// The engine rejected the facts or failed to encode output.
    #[error(transparent)]
    Usage(#[from] UsageError),

    /// Reading input or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Input or output JSON could not be processed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The configuration file is missing or malformed.
    #[error("Config error: {0}")]
    Config(String),

    /// The input file violates a limit or is not a fact file.
    #[error("Invalid input: {0}")]
    Input(String),
}
