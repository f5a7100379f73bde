//! Pak metadata index.

use indexmap::IndexMap;
use serde::Serialize;

use crate::Result;

/// Type tag preceding each metadata value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ValueType {
    /// Null value. Never emitted at the metadata level.
    Null = 1,
    /// IEEE-754 double.
    Double = 2,
    /// Boolean. Never emitted at the metadata level.
    Boolean = 3,
    /// Signed VLQ integer.
    SignedVarint = 4,
    /// Length-prefixed string.
    String = 5,
    /// Array of tagged values.
    Array = 6,
    /// Nested object. Never emitted at the metadata level.
    Object = 7,
}

impl TryFrom<u8> for ValueType {
    type Error = u8;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Null),
            2 => Ok(Self::Double),
            3 => Ok(Self::Boolean),
            4 => Ok(Self::SignedVarint),
            5 => Ok(Self::String),
            6 => Ok(Self::Array),
            7 => Ok(Self::Object),
            other => Err(other),
        }
    }
}

/// A decoded metadata value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetadataValue {
    /// A double-precision number.
    Double(f64),
    /// A signed integer.
    Integer(i64),
    /// A string.
    String(String),
    /// An ordered list of strings.
    StringArray(Vec<String>),
}

impl MetadataValue {
    /// The type tag this value is encoded with.
    pub fn value_type(&self) -> ValueType {
        match self {
            MetadataValue::Double(_) => ValueType::Double,
            MetadataValue::Integer(_) => ValueType::SignedVarint,
            MetadataValue::String(_) => ValueType::String,
            MetadataValue::StringArray(_) => ValueType::Array,
        }
    }

    /// Get the value as a string, if it is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetadataValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::String(value.to_string())
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        MetadataValue::Integer(value)
    }
}

impl From<f64> for MetadataValue {
    fn from(value: f64) -> Self {
        MetadataValue::Double(value)
    }
}

impl From<Vec<String>> for MetadataValue {
    fn from(value: Vec<String>) -> Self {
        MetadataValue::StringArray(value)
    }
}

/// The archive's metadata: string keys to typed values, in archive order.
///
/// A key that appears twice keeps its first position and takes the later value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PakMetadata {
    entries: IndexMap<String, MetadataValue>,
}

impl PakMetadata {
    /// Create an empty metadata map.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, key: String, value: MetadataValue) {
        self.entries.insert(key, value);
    }

    /// Look up a value by key.
    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.entries.get(key)
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over key/value pairs in archive order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetadataValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Serialize to indented JSON. This is the content of the metadata pseudo-file.
    pub fn to_json_blob(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }
}

impl FromIterator<(String, MetadataValue)> for PakMetadata {
    fn from_iter<T: IntoIterator<Item = (String, MetadataValue)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_value_type_from_byte() {
        assert_eq!(ValueType::try_from(5), Ok(ValueType::String));
        assert_eq!(ValueType::try_from(0), Err(0));
        assert_eq!(ValueType::try_from(8), Err(8));
    }

    #[test]
    fn test_duplicate_key_keeps_position() {
        let mut metadata = PakMetadata::new();
        metadata.insert("name".into(), "first".into());
        metadata.insert("version".into(), 1i64.into());
        metadata.insert("name".into(), "second".into());

        let keys: Vec<_> = metadata.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["name", "version"]);
        assert_eq!(metadata.get("name").and_then(|v| v.as_str()), Some("second"));
    }

    #[test]
    fn test_json_blob() {
        let metadata: PakMetadata = [
            ("name".to_string(), MetadataValue::from("MyMod")),
            ("priority".to_string(), MetadataValue::from(-3i64)),
            ("scale".to_string(), MetadataValue::from(1.5f64)),
            (
                "includes".to_string(),
                MetadataValue::from(vec!["base".to_string(), "extra".to_string()]),
            ),
        ]
        .into_iter()
        .collect();

        let blob = String::from_utf8(metadata.to_json_blob().unwrap()).unwrap();
        assert_eq!(
            blob,
            "{\n  \"name\": \"MyMod\",\n  \"priority\": -3,\n  \"scale\": 1.5,\n  \"includes\": [\n    \"base\",\n    \"extra\"\n  ]\n}"
        );
    }

    #[test]
    fn test_empty_json_blob() {
        assert_eq!(PakMetadata::new().to_json_blob().unwrap(), b"{}");
    }
}
