//! Pak archive reader.
//!
//! The archive parses its metadata and item table once when opened and keeps
//! the stream for payload reads. The stream has a single position, so each
//! seek + read pair runs under one lock.

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

use memmap2::Mmap;
use pakfs_common::StreamReader;
use parking_lot::Mutex;

use crate::index;
use crate::{PakItem, PakMetadata, Result};

/// An open pak archive.
///
/// Metadata and items are immutable after opening and can be read from any
/// thread. Payload reads are serialized on the underlying stream.
pub struct PakArchive<R = BufReader<File>> {
    /// Archive file name
    name: String,
    /// Decoded metadata index
    metadata: PakMetadata,
    /// Item table, in archive order
    items: Vec<PakItem>,
    /// Backing stream, shared by all payload reads
    stream: Mutex<StreamReader<R>>,
}

impl PakArchive {
    /// Open a pak archive from disk with a buffered file handle.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        Self::load(archive_name(path), BufReader::new(file))
    }
}

impl PakArchive<Cursor<Mmap>> {
    /// Open a pak archive from disk by memory-mapping it.
    ///
    /// The file must not be modified while the archive is open.
    pub fn open_mapped<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };
        Self::load(archive_name(path), Cursor::new(mmap))
    }
}

impl<R: Read + Seek> PakArchive<R> {
    /// Parse an archive from any seekable stream.
    pub fn from_reader(reader: R) -> Result<Self> {
        Self::load("memory".to_string(), reader)
    }

    fn load(name: String, reader: R) -> Result<Self> {
        let mut stream = StreamReader::new(reader);
        let metadata = index::read_index(&mut stream)?;
        let items = index::read_items(&mut stream)?;

        tracing::info!(
            "Opened {}: {} items, {} metadata keys",
            name,
            items.len(),
            metadata.len()
        );

        Ok(Self {
            name,
            metadata,
            items,
            stream: Mutex::new(stream),
        })
    }

    /// Get the archive name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the decoded metadata.
    #[inline]
    pub fn metadata(&self) -> &PakMetadata {
        &self.metadata
    }

    /// Get all items in archive order.
    #[inline]
    pub fn items(&self) -> &[PakItem] {
        &self.items
    }

    /// Get the number of items.
    #[inline]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Find an item by exact path.
    pub fn find(&self, path: &str) -> Option<&PakItem> {
        self.items.iter().find(|item| item.path() == path)
    }

    /// Read an item's full payload.
    pub fn read_item(&self, item: &PakItem) -> Result<Vec<u8>> {
        let mut stream = self.stream.lock();
        index::read_item(&mut *stream, item)
    }

    /// Fill `buf` from an item's payload starting `offset` bytes into it.
    pub fn read_item_range(&self, item: &PakItem, offset: u64, buf: &mut [u8]) -> Result<()> {
        tracing::debug!(
            "Reading {} bytes of {} at item offset {}",
            buf.len(),
            item.path(),
            offset
        );
        let mut stream = self.stream.lock();
        index::read_item_range(&mut *stream, item, offset, buf)
    }

    /// Close the archive and return the underlying stream.
    pub fn into_inner(self) -> R {
        self.stream.into_inner().into_inner()
    }
}

fn archive_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string()
}

impl<R> std::fmt::Debug for PakArchive<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PakArchive")
            .field("name", &self.name)
            .field("metadata", &self.metadata.len())
            .field("items", &self.items.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::PakBuilder;

    #[test]
    fn test_from_reader() {
        let data = PakBuilder::new()
            .metadata("name", "Example")
            .file("/scripts/init.lua", b"print('hi')".to_vec())
            .build();

        let archive = PakArchive::from_reader(Cursor::new(data)).unwrap();
        assert_eq!(archive.name(), "memory");
        assert_eq!(archive.item_count(), 1);

        let item = archive.find("/scripts/init.lua").unwrap();
        assert_eq!(archive.read_item(item).unwrap(), b"print('hi')");
        assert!(archive.find("/scripts").is_none());
    }

    #[test]
    fn test_read_item_range() {
        let data = PakBuilder::new()
            .file("/a.bin", (0u8..64).collect())
            .build();
        let archive = PakArchive::from_reader(Cursor::new(data)).unwrap();
        let item = archive.find("/a.bin").unwrap().clone();

        let mut buf = vec![0u8; 3];
        archive.read_item_range(&item, 60, &mut buf).unwrap();
        assert_eq!(buf, [60, 61, 62]);
    }

    #[test]
    fn test_debug_is_compact() {
        let data = PakBuilder::new().file("/x", vec![1]).build();
        let archive = PakArchive::from_reader(Cursor::new(data)).unwrap();
        let debug = format!("{archive:?}");
        assert!(debug.contains("items: 1"));
    }
}
