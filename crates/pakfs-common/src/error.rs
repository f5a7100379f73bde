//! Error types for pakfs-common.

use thiserror::Error;

/// Common error type for PakFS decoding.
#[derive(Debug, Error)]
pub enum Error {
    /// Fewer bytes were available than the read required.
    #[error("truncated stream: needed {needed} bytes but only {available} available")]
    TruncatedStream { needed: u64, available: u64 },

    /// A variable-length quantity did not terminate within the encoding bound.
    #[error("malformed VLQ: no terminating byte within 10 bytes")]
    MalformedVarint,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error means the stream ended before a read completed.
    pub fn is_truncated(&self) -> bool {
        match self {
            Error::TruncatedStream { .. } => true,
            Error::Io(e) => e.kind() == std::io::ErrorKind::UnexpectedEof,
            Error::MalformedVarint => false,
        }
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
