//! Error types for the pak crate.

use thiserror::Error;

/// Errors that can occur when working with pak archives.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error (truncation, malformed VLQ).
    #[error("{0}")]
    Common(#[from] pakfs_common::Error),

    /// The archive does not follow the pak layout.
    #[error("invalid pak format: {0}")]
    InvalidFormat(String),

    /// A read was requested outside an item's bounds.
    #[error("range {offset}+{length} is outside item {path} ({size} bytes)")]
    ItemRangeOutOfBounds {
        path: String,
        offset: u64,
        length: u64,
        size: u64,
    },

    /// Metadata could not be serialized.
    #[error("metadata serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error means the archive ended before a read completed.
    pub fn is_truncated(&self) -> bool {
        match self {
            Error::Common(e) => e.is_truncated(),
            Error::Io(e) => e.kind() == std::io::ErrorKind::UnexpectedEof,
            _ => false,
        }
    }

    /// Whether this error is an [`Error::InvalidFormat`].
    pub fn is_invalid_format(&self) -> bool {
        matches!(self, Error::InvalidFormat(_))
    }
}

/// Result type for pak operations.
pub type Result<T> = std::result::Result<T, Error>;
