//! Pak archive item.

use crate::{Error, Result};

/// An item (file) within a pak archive.
///
/// This describes where the item's bytes live, not the bytes themselves.
/// Use [`PakArchive::read_item`](crate::PakArchive::read_item) to get the
/// contents. Offsets are not checked against the archive size until the item
/// is read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PakItem {
    /// Absolute, `/`-separated path within the archive.
    path: String,
    /// Byte offset of the payload from the start of the archive.
    offset: u64,
    /// Payload length in bytes.
    length: u64,
}

impl PakItem {
    /// Create a new pak item.
    pub fn new(path: impl Into<String>, offset: u64, length: u64) -> Self {
        Self {
            path: path.into(),
            offset,
            length,
        }
    }

    /// Get the item path.
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Get the payload offset.
    #[inline]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Get the payload length.
    #[inline]
    pub fn length(&self) -> u64 {
        self.length
    }

    /// The directory containing this item, including the trailing `/`.
    ///
    /// Returns an empty string for a path without any `/`.
    pub fn directory(&self) -> &str {
        match self.path.rfind('/') {
            Some(i) => &self.path[..=i],
            None => "",
        }
    }

    /// The final path segment.
    pub fn file_name(&self) -> &str {
        match self.path.rfind('/') {
            Some(i) => &self.path[i + 1..],
            None => &self.path,
        }
    }

    /// Check that `offset..offset + length` lies within the payload.
    pub fn check_range(&self, offset: u64, length: u64) -> Result<()> {
        let in_bounds = offset
            .checked_add(length)
            .is_some_and(|end| end <= self.length);
        if in_bounds {
            Ok(())
        } else {
            Err(Error::ItemRangeOutOfBounds {
                path: self.path.clone(),
                offset,
                length,
                size: self.length,
            })
        }
    }

    /// Get the file extension, if any.
    pub fn extension(&self) -> Option<&str> {
        let name = self.file_name();
        match name.rfind('.') {
            Some(0) | None => None,
            Some(i) => Some(&name[i + 1..]),
        }
    }
}
