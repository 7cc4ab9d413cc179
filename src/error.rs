//! Error types for schema loading and wire decoding.
//!
//! The selector engine itself is total and has no error path; only the IO
//! and wire layers are fallible.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while loading or decoding a serialized schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Parse errors (exit code 2)
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    // Wire errors (exit code 2); `path` is a JSON-Pointer-style location
    #[error("invalid schema at {path}: {message}")]
    InvalidSchema { path: String, message: String },
}

impl SchemaError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            SchemaError::FileNotFound { .. } | SchemaError::ReadError { .. } => 3,
            _ => 2,
        }
    }
}
