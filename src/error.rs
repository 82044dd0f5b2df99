//! Error types for rust-sqlgraph

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while scanning SQL scripts
#[derive(Error, Debug)]
pub enum SqlGraphError {
    #[error("Failed to read SQL file: {path}")]
    SqlFileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Input path does not exist: {path}")]
    InputNotFound { path: PathBuf },

    #[error("Invalid exclude pattern: {pattern}")]
    InvalidExcludePattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("Failed to write output to {path}")]
    OutputWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {message}")]
    SerializeError { message: String },

    #[error("Unknown object kind: {keyword}")]
    UnknownObjectKind { keyword: String },
}

impl From<serde_json::Error> for SqlGraphError {
    fn from(err: serde_json::Error) -> Self {
        SqlGraphError::SerializeError {
            message: err.to_string(),
        }
    }
}
