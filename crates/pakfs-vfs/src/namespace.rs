//! Directory index over a pak item table.
//!
//! Items are grouped by their containing directory (the path up to and
//! including the last `/`). Keys live in a `BTreeMap`, so all directories
//! below a prefix form one contiguous range: listing subdirectories and
//! testing whether a path is a directory are prefix queries, never substring
//! searches.

use std::collections::BTreeMap;
use std::ops::Bound;

use hashbrown::HashSet;
use pakfs_pak::PakItem;

use crate::filter::file_name_cmp;
use crate::path;

/// An entry in a projected directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceEntry {
    /// A directory.
    Directory { name: String },
    /// A read-only file.
    File { name: String, size: u64 },
}

impl NamespaceEntry {
    /// Get the entry name.
    #[inline]
    pub fn name(&self) -> &str {
        match self {
            NamespaceEntry::Directory { name } | NamespaceEntry::File { name, .. } => name,
        }
    }

    /// Get the size in bytes. Directories are always 0.
    #[inline]
    pub fn size(&self) -> u64 {
        match self {
            NamespaceEntry::Directory { .. } => 0,
            NamespaceEntry::File { size, .. } => *size,
        }
    }

    /// Check if this entry is a directory.
    #[inline]
    pub fn is_directory(&self) -> bool {
        matches!(self, NamespaceEntry::Directory { .. })
    }

    /// Check if this entry is read-only. Every file in the projection is.
    #[inline]
    pub fn is_read_only(&self) -> bool {
        !self.is_directory()
    }
}

/// The projected directory tree of one archive.
///
/// Built once when the archive is opened; read-only afterwards.
#[derive(Debug, Clone)]
pub struct Namespace {
    /// Directory key (with trailing `/`) to the items directly inside it
    directories: BTreeMap<String, Vec<PakItem>>,
    /// Name of the synthetic metadata file in the root
    metadata_name: String,
    /// Size of the serialized metadata blob
    metadata_size: u64,
}

impl Namespace {
    /// Index items by directory.
    pub fn build<'a, I>(items: I, metadata_name: &str, metadata_size: u64) -> Self
    where
        I: IntoIterator<Item = &'a PakItem>,
    {
        let mut directories: BTreeMap<String, Vec<PakItem>> = BTreeMap::new();
        for item in items {
            directories
                .entry(item.directory().to_string())
                .or_default()
                .push(item.clone());
        }

        Self {
            directories,
            metadata_name: metadata_name.to_string(),
            metadata_size,
        }
    }

    /// Number of directories that directly hold items.
    pub fn directory_count(&self) -> usize {
        self.directories.len()
    }

    /// Name of the synthetic metadata file.
    pub fn metadata_name(&self) -> &str {
        &self.metadata_name
    }

    /// Absolute path of the synthetic metadata file.
    pub fn metadata_path(&self) -> String {
        format!("/{}", self.metadata_name)
    }

    /// Size of the synthetic metadata file.
    pub fn metadata_size(&self) -> u64 {
        self.metadata_size
    }

    /// Directory keys strictly below `key`, in key order.
    fn keys_below<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.directories
            .range::<str, _>((Bound::Excluded(key), Bound::Unbounded))
            .map(|(k, _)| k.as_str())
            .take_while(move |k| k.starts_with(key))
    }

    /// Whether `path` names a directory in the projection.
    ///
    /// A directory exists if any indexed directory key has it as a prefix;
    /// directories holding only subdirectories therefore count too.
    pub fn is_directory(&self, path: &str) -> bool {
        let key = path::directory_key(path);
        key == "/" || self.directories.contains_key(&key) || self.keys_below(&key).next().is_some()
    }

    /// Find the item stored at exactly `path`.
    pub fn find_item(&self, path: &str) -> Option<&PakItem> {
        let normalized = path::normalize(path);
        let directory = match normalized.rfind('/') {
            Some(i) => &normalized[..=i],
            None => return None,
        };
        self.directories
            .get(directory)?
            .iter()
            .find(|item| item.path() == normalized)
    }

    /// Entries directly under `path`, in discovery order: subdirectories,
    /// then the metadata file when listing the root, then items.
    ///
    /// Listing a path that is not a directory yields nothing.
    pub fn list(&self, path: &str) -> Vec<NamespaceEntry> {
        let key = path::directory_key(path);
        let mut entries = Vec::new();

        let mut seen = HashSet::new();
        for directory in self.keys_below(&key) {
            let rest = &directory[key.len()..];
            let name = rest.split('/').next().unwrap_or(rest);
            if name.is_empty() || !seen.insert(name) {
                continue;
            }
            entries.push(NamespaceEntry::Directory {
                name: name.to_string(),
            });
        }

        if key == "/" {
            entries.push(NamespaceEntry::File {
                name: self.metadata_name.clone(),
                size: self.metadata_size,
            });
        }

        if let Some(items) = self.directories.get(&key) {
            entries.extend(
                items
                    .iter()
                    .filter(|item| !item.file_name().is_empty())
                    .map(|item| NamespaceEntry::File {
                        name: item.file_name().to_string(),
                        size: item.length(),
                    }),
            );
        }

        entries
    }

    /// Entries directly under `path`, ordered by name as a filesystem would.
    pub fn list_sorted(&self, path: &str) -> Vec<NamespaceEntry> {
        let mut entries = self.list(path);
        entries.sort_by(|a, b| file_name_cmp(a.name(), b.name()));
        entries
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn items(paths: &[(&str, u64)]) -> Vec<PakItem> {
        paths
            .iter()
            .enumerate()
            .map(|(i, (p, len))| PakItem::new(*p, i as u64 * 100, *len))
            .collect()
    }

    fn dir(name: &str) -> NamespaceEntry {
        NamespaceEntry::Directory { name: name.into() }
    }

    fn file(name: &str, size: u64) -> NamespaceEntry {
        NamespaceEntry::File {
            name: name.into(),
            size,
        }
    }

    fn sample() -> Namespace {
        let items = items(&[
            ("/a/b/file1.txt", 10),
            ("/a/c/file2.txt", 20),
            ("/a/file3.txt", 30),
            ("/a/b/deeper/file4.txt", 40),
            ("/root.config", 5),
        ]);
        Namespace::build(&items, "_metadata", 42)
    }

    #[test]
    fn test_list_unique_subdirectories() {
        let ns = sample();
        assert_eq!(ns.list("/a/"), [dir("b"), dir("c"), file("file3.txt", 30)]);
        assert_eq!(ns.list("a"), ns.list("/a/"));
    }

    #[test]
    fn test_list_root_has_metadata() {
        let ns = sample();
        assert_eq!(
            ns.list("/"),
            [dir("a"), file("_metadata", 42), file("root.config", 5)]
        );
        assert_eq!(ns.list(""), ns.list("/"));
    }

    #[test]
    fn test_list_only_metadata_for_empty_archive() {
        let ns = Namespace::build(std::iter::empty(), "_metadata", 2);
        assert_eq!(ns.list("/"), [file("_metadata", 2)]);
        assert!(ns.list("/nothing").is_empty());
    }

    #[test]
    fn test_intermediate_directory() {
        let items = items(&[("/x/y/z/deep.bin", 1)]);
        let ns = Namespace::build(&items, "_metadata", 0);
        assert!(ns.is_directory("/x"));
        assert!(ns.is_directory("x\\y"));
        assert_eq!(ns.list("/x"), [dir("y")]);
    }

    #[test]
    fn test_is_directory_uses_prefix_not_substring() {
        let items = items(&[("/a/bc", 3), ("/a/bcd/inner.txt", 4), ("/zz/a/bc/x", 5)]);
        let ns = Namespace::build(&items, "_metadata", 0);

        // "/a/bc" is a textual substring of "/a/bcd/" and of "/zz/a/bc/",
        // but it is a file.
        assert!(!ns.is_directory("/a/bc"));
        assert!(ns.find_item("/a/bc").is_some());
        assert!(ns.is_directory("/a/bcd"));
        assert!(ns.is_directory("/a"));
        assert!(!ns.is_directory("/a/b"));
        assert_eq!(ns.list("/a"), [dir("bcd"), file("bc", 3)]);
    }

    #[test]
    fn test_find_item() {
        let ns = sample();
        let item = ns.find_item("a\\b\\file1.txt").unwrap();
        assert_eq!(item.path(), "/a/b/file1.txt");
        assert!(ns.find_item("/a/b/missing.txt").is_none());
        assert!(ns.find_item("/a/b").is_none());
    }

    #[test]
    fn test_list_sorted_interleaves() {
        let items = items(&[("/d/b.lua", 1), ("/d/a.txt", 2), ("/d/am/x", 3), ("/d/C.txt", 4)]);
        let ns = Namespace::build(&items, "_metadata", 0);
        let names: Vec<_> = ns.list_sorted("/d").iter().map(|e| e.name().to_string()).collect();
        assert_eq!(names, ["a.txt", "am", "b.lua", "C.txt"]);
    }

    #[test]
    fn test_directory_item_names_are_skipped() {
        let items = items(&[("/dir/", 0), ("/dir/real.txt", 1)]);
        let ns = Namespace::build(&items, "_metadata", 0);
        assert_eq!(ns.list("/dir"), [file("real.txt", 1)]);
    }
}
