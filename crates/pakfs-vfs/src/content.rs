//! Path resolution and content reads.

use std::io::{Read, Seek};

use pakfs_pak::{PakArchive, PakItem};

use crate::path;
use crate::{Error, Namespace, NamespaceEntry, Result};

/// What a virtual path points at.
enum Target<'a> {
    Metadata,
    Directory,
    Item(&'a PakItem),
}

/// Resolves virtual paths and reads their bytes.
///
/// Holds the archive, its namespace and the serialized metadata blob. All
/// three are immutable; only the archive's stream is locked, per read.
pub struct ContentAccessor<R> {
    archive: PakArchive<R>,
    namespace: Namespace,
    metadata: Vec<u8>,
}

impl<R: Read + Seek> ContentAccessor<R> {
    /// Serialize the archive metadata and index its items.
    pub fn new(archive: PakArchive<R>, metadata_name: &str) -> Result<Self> {
        let metadata = archive.metadata().to_json_blob()?;
        let namespace = Namespace::build(archive.items(), metadata_name, metadata.len() as u64);

        tracing::debug!(
            "Indexed {} directories, metadata blob is {} bytes",
            namespace.directory_count(),
            metadata.len()
        );

        Ok(Self {
            archive,
            namespace,
            metadata,
        })
    }

    /// Get the underlying archive.
    pub fn archive(&self) -> &PakArchive<R> {
        &self.archive
    }

    /// Get the namespace.
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Get the serialized metadata blob.
    pub fn metadata_blob(&self) -> &[u8] {
        &self.metadata
    }

    fn locate(&self, normalized: &str) -> Option<Target<'_>> {
        if normalized == self.namespace.metadata_path() {
            Some(Target::Metadata)
        } else if self.namespace.is_directory(normalized) {
            Some(Target::Directory)
        } else {
            self.namespace.find_item(normalized).map(Target::Item)
        }
    }

    /// Resolve a virtual path to the entry it names.
    pub fn resolve(&self, virtual_path: &str) -> Result<NamespaceEntry> {
        let normalized = path::normalize(virtual_path);
        let name = path::file_name(&normalized).to_string();

        match self.locate(&normalized) {
            Some(Target::Metadata) => Ok(NamespaceEntry::File {
                name,
                size: self.metadata.len() as u64,
            }),
            Some(Target::Directory) => Ok(NamespaceEntry::Directory { name }),
            Some(Target::Item(item)) => Ok(NamespaceEntry::File {
                name,
                size: item.length(),
            }),
            None => Err(Error::NotFound(normalized)),
        }
    }

    /// Read `length` bytes at `offset` within the file at `virtual_path`.
    ///
    /// Directories and unknown paths are [`Error::NotFound`]. The range is
    /// checked against the item before the staging buffer is allocated; the
    /// allocation itself is fallible and fails with [`Error::OutOfMemory`].
    pub fn read_bytes(&self, virtual_path: &str, offset: u64, length: u64) -> Result<Vec<u8>> {
        let normalized = path::normalize(virtual_path);

        match self.locate(&normalized) {
            Some(Target::Metadata) => {
                let start = usize::try_from(offset)
                    .unwrap_or(usize::MAX)
                    .min(self.metadata.len());
                let end = usize::try_from(length)
                    .ok()
                    .and_then(|l| start.checked_add(l))
                    .unwrap_or(usize::MAX)
                    .min(self.metadata.len());
                Ok(self.metadata[start..end].to_vec())
            }
            Some(Target::Item(item)) => {
                item.check_range(offset, length)?;
                let mut buf = staging_buffer(length)?;
                self.archive.read_item_range(item, offset, &mut buf)?;
                Ok(buf)
            }
            Some(Target::Directory) | None => Err(Error::NotFound(normalized)),
        }
    }
}

fn staging_buffer(length: u64) -> Result<Vec<u8>> {
    let size = usize::try_from(length).map_err(|_| Error::OutOfMemory(length))?;
    let mut buf = Vec::new();
    buf.try_reserve_exact(size)
        .map_err(|_| Error::OutOfMemory(length))?;
    buf.resize(size, 0);
    Ok(buf)
}

impl<R> std::fmt::Debug for ContentAccessor<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentAccessor")
            .field("archive", &self.archive)
            .field("directories", &self.namespace.directory_count())
            .field("metadata", &self.metadata.len())
            .finish()
    }
}
