//! Archive image builder for tests.
//!
//! [`PakBuilder`] lays out a complete archive in memory: an 8-byte magic, an
//! 8-byte big-endian index offset (whose low half sits at `0xC`), the item
//! payloads, and finally the index and item table.

use byteorder::{BigEndian, ByteOrder};
use pakfs_common::vlq;

use crate::{MetadataValue, ValueType, INDEX_OFFSET_POSITION, INDEX_TAG};

/// Magic written at the start of built archives. Not checked by the reader.
pub const MAGIC: &[u8; 8] = b"SBAsset6";

const HEADER_SIZE: usize = 16;

#[derive(Debug, Clone)]
enum MetadataEntry {
    Value(MetadataValue),
    /// Type tag and value bytes, written verbatim.
    Raw(Vec<u8>),
}

/// Builds pak archive images.
#[derive(Debug, Clone)]
pub struct PakBuilder {
    metadata: Vec<(String, MetadataEntry)>,
    files: Vec<(String, Vec<u8>)>,
    /// Table entries without a payload: path, offset, length
    declared: Vec<(String, u64, u64)>,
    index_tag: [u8; 5],
}

impl Default for PakBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PakBuilder {
    /// Start an empty archive.
    pub fn new() -> Self {
        Self {
            metadata: Vec::new(),
            files: Vec::new(),
            declared: Vec::new(),
            index_tag: *INDEX_TAG,
        }
    }

    /// Add a metadata entry.
    pub fn metadata(mut self, key: &str, value: impl Into<MetadataValue>) -> Self {
        self.metadata
            .push((key.to_string(), MetadataEntry::Value(value.into())));
        self
    }

    /// Add a metadata entry whose tag and value bytes are written verbatim.
    pub fn raw_metadata(mut self, key: &str, tagged_value: Vec<u8>) -> Self {
        self.metadata
            .push((key.to_string(), MetadataEntry::Raw(tagged_value)));
        self
    }

    /// Add an item.
    pub fn file(mut self, path: &str, data: Vec<u8>) -> Self {
        self.files.push((path.to_string(), data));
        self
    }

    /// Add an item-table entry with an arbitrary range and no payload.
    pub fn declared_item(mut self, path: &str, offset: u64, length: u64) -> Self {
        self.declared.push((path.to_string(), offset, length));
        self
    }

    /// Replace the index literal.
    pub fn index_tag(mut self, tag: [u8; 5]) -> Self {
        self.index_tag = tag;
        self
    }

    /// Read back the index offset of a built archive.
    pub fn index_offset_of(data: &[u8]) -> u64 {
        let start = INDEX_OFFSET_POSITION as usize;
        u64::from(BigEndian::read_u32(&data[start..start + 4]))
    }

    /// Lay out the archive.
    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(MAGIC);
        out.resize(HEADER_SIZE, 0);

        let mut table = Vec::with_capacity(self.files.len() + self.declared.len());
        for (path, data) in &self.files {
            table.push((path.as_str(), out.len() as u64, data.len() as u64));
            out.extend_from_slice(data);
        }
        table.extend(
            self.declared
                .iter()
                .map(|(path, offset, length)| (path.as_str(), *offset, *length)),
        );

        let index_offset = out.len() as u64;
        BigEndian::write_u64(&mut out[8..HEADER_SIZE], index_offset);

        out.extend_from_slice(&self.index_tag);
        vlq::write_unsigned(self.metadata.len() as u64, &mut out);
        for (key, entry) in &self.metadata {
            vlq::write_string(key, &mut out);
            match entry {
                MetadataEntry::Value(value) => write_value(value, &mut out),
                MetadataEntry::Raw(bytes) => out.extend_from_slice(bytes),
            }
        }

        vlq::write_unsigned(table.len() as u64, &mut out);
        for (path, offset, length) in table {
            vlq::write_string(path, &mut out);
            write_u64(offset, &mut out);
            write_u64(length, &mut out);
        }

        out
    }
}

fn write_u64(value: u64, out: &mut Vec<u8>) {
    let mut bytes = [0u8; 8];
    BigEndian::write_u64(&mut bytes, value);
    out.extend_from_slice(&bytes);
}

fn write_value(value: &MetadataValue, out: &mut Vec<u8>) {
    out.push(value.value_type() as u8);
    match value {
        MetadataValue::Double(d) => {
            let mut bytes = [0u8; 8];
            BigEndian::write_f64(&mut bytes, *d);
            out.extend_from_slice(&bytes);
        }
        MetadataValue::Integer(i) => vlq::write_signed(*i, out),
        MetadataValue::String(s) => vlq::write_string(s, out),
        MetadataValue::StringArray(values) => {
            vlq::write_unsigned(values.len() as u64, out);
            for s in values {
                out.push(ValueType::String as u8);
                vlq::write_string(s, out);
            }
        }
    }
}
