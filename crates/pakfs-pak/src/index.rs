//! Metadata index and item table decoding.
//!
//! Decoding runs in two phases over one stream: [`read_index`] locates and
//! parses the metadata index, leaving the stream just past it, and
//! [`read_items`] parses the item table from wherever the stream is.

use std::io::{Read, Seek};

use pakfs_common::{ByteOrder, StreamReader};

use crate::{Error, MetadataValue, PakItem, PakMetadata, Result, ValueType};

/// Position of the 4-byte index offset.
pub const INDEX_OFFSET_POSITION: u64 = 0xC;

/// Literal at the start of the index.
pub const INDEX_TAG: &[u8; 5] = b"INDEX";

/// Preallocation cap for counts read from the archive.
const MAX_PREALLOCATED: u64 = 4096;

/// Locate and parse the metadata index.
///
/// On success the stream is positioned at the start of the item table.
pub fn read_index<R: Read + Seek>(reader: &mut StreamReader<R>) -> Result<PakMetadata> {
    reader.seek(INDEX_OFFSET_POSITION)?;
    let index_offset = reader.read_u32(ByteOrder::ARCHIVE)?;
    reader.seek(u64::from(index_offset))?;

    let mut tag = [0u8; INDEX_TAG.len()];
    reader.read_exact_into(&mut tag)?;
    if &tag != INDEX_TAG {
        return Err(Error::InvalidFormat(format!(
            "expected index tag {:?} at offset {index_offset:#x}, found {:?}",
            String::from_utf8_lossy(INDEX_TAG),
            String::from_utf8_lossy(&tag),
        )));
    }

    let count = reader.read_var_u64()?;
    let mut metadata = PakMetadata::new();
    for _ in 0..count {
        let key = reader.read_string()?;
        let value = read_value(reader, &key)?;
        metadata.insert(key, value);
    }

    Ok(metadata)
}

fn read_value<R: Read>(reader: &mut StreamReader<R>, key: &str) -> Result<MetadataValue> {
    let tag = reader.read_u8()?;
    match ValueType::try_from(tag) {
        Ok(ValueType::Double) => Ok(MetadataValue::Double(reader.read_f64(ByteOrder::ARCHIVE)?)),
        Ok(ValueType::SignedVarint) => Ok(MetadataValue::Integer(reader.read_var_i64()?)),
        Ok(ValueType::String) => Ok(MetadataValue::String(reader.read_string()?)),
        Ok(ValueType::Array) => {
            let count = reader.read_var_u64()?;
            let mut values = Vec::with_capacity(count.min(MAX_PREALLOCATED) as usize);
            for _ in 0..count {
                let element = reader.read_u8()?;
                if element != ValueType::String as u8 {
                    return Err(Error::InvalidFormat(format!(
                        "metadata array {key:?} contains a non-string element (type {element})"
                    )));
                }
                values.push(reader.read_string()?);
            }
            Ok(MetadataValue::StringArray(values))
        }
        Ok(other @ (ValueType::Null | ValueType::Boolean | ValueType::Object)) => Err(
            Error::InvalidFormat(format!("metadata key {key:?} has unsupported type {other:?}")),
        ),
        Err(unknown) => Err(Error::InvalidFormat(format!(
            "metadata key {key:?} has unknown type tag {unknown}"
        ))),
    }
}

/// Parse the item table starting at the current stream position.
pub fn read_items<R: Read>(reader: &mut StreamReader<R>) -> Result<Vec<PakItem>> {
    let count = reader.read_var_u64()?;
    let mut items = Vec::with_capacity(count.min(MAX_PREALLOCATED) as usize);

    for _ in 0..count {
        let path = reader.read_string()?;
        let offset = reader.read_u64(ByteOrder::ARCHIVE)?;
        let length = reader.read_u64(ByteOrder::ARCHIVE)?;
        items.push(PakItem::new(path, offset, length));
    }

    Ok(items)
}

/// Read an item's full payload: one seek, one read.
pub fn read_item<R: Read + Seek>(reader: &mut StreamReader<R>, item: &PakItem) -> Result<Vec<u8>> {
    reader.seek(item.offset())?;
    Ok(reader.read_bytes(item.length())?)
}

/// Fill `buf` from the item's payload starting `offset` bytes into it.
pub fn read_item_range<R: Read + Seek>(
    reader: &mut StreamReader<R>,
    item: &PakItem,
    offset: u64,
    buf: &mut [u8],
) -> Result<()> {
    item.check_range(offset, buf.len() as u64)?;

    let start = item.offset().checked_add(offset).ok_or_else(|| {
        Error::InvalidFormat(format!("item {} offset overflows", item.path()))
    })?;
    reader.seek(start)?;
    reader.read_exact_into(buf)?;
    Ok(())
}
