//! Pakfs - pak archive reading and read-only filesystem projection.
//!
//! This crate provides a unified interface to the pakfs crates.
//!
//! # Crates
//!
//! - [`pakfs_common`] - Stream reading with explicit byte order, VLQ codec
//! - [`pakfs_pak`] - Pak archive decoding (metadata index, item table, payloads)
//! - [`pakfs_vfs`] - Directory tree, listing sessions and projection callbacks
//!
//! # Example
//!
//! ```no_run
//! use pakfs::prelude::*;
//!
//! let archive = PakArchive::open("packed.pak")?;
//! for (key, value) in archive.metadata().iter() {
//!     println!("{key}: {value:?}");
//! }
//!
//! if let Some(item) = archive.find("/player.config") {
//!     let data = archive.read_item(item)?;
//!     println!("{} bytes", data.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub use pakfs_common as common;
pub use pakfs_pak as pak;
pub use pakfs_vfs as vfs;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use pakfs_common::{ByteOrder, StreamReader};
    pub use pakfs_pak::{MetadataValue, PakArchive, PakItem, PakMetadata};
    pub use pakfs_vfs::{
        BoundedSink, EntryInfo, EntrySink, ListingId, PakProvider, ProjectionCallbacks,
        ProviderOptions, Status,
    };
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
