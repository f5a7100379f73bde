//! Error types for the virtual filesystem.

use thiserror::Error;

use crate::ListingId;

/// Errors that can occur when serving the projected namespace.
#[derive(Debug, Error)]
pub enum Error {
    /// Pak archive error.
    #[error("{0}")]
    Pak(#[from] pakfs_pak::Error),

    /// The path does not resolve to any entry.
    #[error("not found: {0}")]
    NotFound(String),

    /// A listing with this identifier is already active.
    #[error("listing {0} already exists")]
    ListingExists(ListingId),

    /// No listing with this identifier is active.
    #[error("listing {0} not found")]
    ListingNotFound(ListingId),

    /// A staging buffer could not be allocated.
    #[error("out of memory allocating {0} bytes")]
    OutOfMemory(u64),
}

/// Result type for virtual filesystem operations.
pub type Result<T> = std::result::Result<T, Error>;
