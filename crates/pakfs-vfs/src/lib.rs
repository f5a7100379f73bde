//! Virtual filesystem over a pak archive.
//!
//! The archive's flat item paths are projected into a read-only directory
//! tree that a filesystem-projection host can enumerate and read on demand:
//!
//! - [`Namespace`] - Directory index built once from the item table
//! - [`EnumerationSession`] - Per-listing cursor with a sticky name filter
//! - [`ContentAccessor`] - Path resolution and byte-range reads
//! - [`PakProvider`] - The host-facing callbacks ([`ProjectionCallbacks`])
//!
//! The root of the tree also holds a synthetic file (by default `_metadata`)
//! containing the archive's metadata as indented JSON.
//!
//! # Example
//!
//! ```no_run
//! use pakfs_vfs::{EntryInfo, ListingId, PakProvider, ProjectionCallbacks, ProviderOptions, Status};
//!
//! let provider = PakProvider::open("packed.pak", ProviderOptions::default())?;
//!
//! let id = ListingId(1);
//! let mut page: Vec<EntryInfo> = Vec::new();
//! assert_eq!(provider.begin_listing(id, "/items"), Status::Ok);
//! provider.continue_listing(id, Some("*.item"), false, &mut page);
//! provider.end_listing(id);
//!
//! for entry in &page {
//!     println!("{} {}", entry.name, entry.size);
//! }
//! # Ok::<(), pakfs_vfs::Error>(())
//! ```

mod content;
mod enumeration;
mod error;
mod filter;
mod namespace;
mod projection;

pub mod path;

pub use content::ContentAccessor;
pub use enumeration::EnumerationSession;
pub use error::{Error, Result};
pub use filter::{file_name_cmp, FileNameFilter};
pub use namespace::{Namespace, NamespaceEntry};
pub use projection::{
    BoundedSink, EntryInfo, EntrySink, ListingId, PakProvider, ProjectionCallbacks,
    ProviderOptions, Status,
};
