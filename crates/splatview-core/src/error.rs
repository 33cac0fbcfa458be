//! Error types for splatview-rs.

use thiserror::Error;

/// The main error type for splatview-rs operations.
#[derive(Error, Debug)]
pub enum SplatviewError {
    /// Mesh data cannot be used for a query (missing or out-of-range indices, mismatched BVH).
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// A registration record could not be decoded.
    #[error("parse error in record {record}: {reason}")]
    Parse {
        /// Zero-based position of the record in the stream.
        record: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// A local-to-ECEF transform file is malformed.
    #[error("invalid transform: {0}")]
    InvalidTransform(String),

    /// A mesh with the given name already exists.
    #[error("mesh '{0}' already exists")]
    MeshExists(String),

    /// A mesh with the given name was not found.
    #[error("mesh '{0}' not found")]
    MeshNotFound(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SplatviewError {
    /// Shorthand for a [`SplatviewError::Parse`] error.
    pub fn parse(record: usize, reason: impl Into<String>) -> Self {
        Self::Parse {
            record,
            reason: reason.into(),
        }
    }
}

/// A specialized Result type for splatview-rs operations.
pub type Result<T> = std::result::Result<T, SplatviewError>;
