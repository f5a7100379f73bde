//! Pak archive reader.
//!
//! A pak archive is a single file holding a typed metadata index and a table
//! of named byte ranges ("items"). The layout is:
//!
//! - A 4-byte index offset at byte `0xC`, in archive byte order
//! - At that offset, the literal `INDEX`, followed by the metadata map
//!   (VLQ count, then key / type tag / value triples)
//! - Immediately after the metadata, the item table (VLQ count, then
//!   path / 8-byte offset / 8-byte length triples)
//!
//! All fixed-width integers are big-endian. Items are stored uncompressed, so
//! reading one is a single seek followed by a single read.
//!
//! # Example
//!
//! ```no_run
//! use pakfs_pak::PakArchive;
//!
//! let archive = PakArchive::open("packed.pak")?;
//!
//! for item in archive.items() {
//!     println!("{}: {} bytes", item.path(), item.length());
//! }
//!
//! if let Some(item) = archive.find("/player.config") {
//!     let data = archive.read_item(item)?;
//! }
//! # Ok::<(), pakfs_pak::Error>(())
//! ```

mod archive;
mod error;
mod index;
mod item;
mod metadata;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use archive::PakArchive;
pub use error::{Error, Result};
pub use index::{read_index, read_item, read_item_range, read_items, INDEX_OFFSET_POSITION, INDEX_TAG};
pub use item::PakItem;
pub use metadata::{MetadataValue, PakMetadata, ValueType};
