// src/error.rs
// Error types for rotor

use thiserror::Error;

/// Main error type for the rotor library
#[derive(Error, Debug)]
pub enum RotorError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for Result using RotorError
pub type Result<T> = std::result::Result<T, RotorError>;

/// Why a selection key could not be derived from a candidate list.
///
/// Never surfaced to callers of `select`; it only decides whether a call is tracked.
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("candidate list cannot be canonicalized: {0}")]
    Unsupported(#[from] serde_json::Error),

    #[error("candidate list is empty")]
    Empty,
}
