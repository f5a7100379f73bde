//! Directory listing sessions.
//!
//! The host drives a listing through start / continue / end calls and decides
//! how many entries it takes per call, so a session is an explicit cursor
//! rather than an iterator. Each session owns its entries and filter; sessions
//! never share state.

use crate::filter::FileNameFilter;
use crate::NamespaceEntry;

/// Cursor over one directory listing.
///
/// A session is created over an ordered snapshot of a directory. [`start`]
/// positions it on the first entry that matches the active filter; after that
/// [`current`] is the entry to hand out and [`advance`] moves past it.
///
/// [`start`]: EnumerationSession::start
/// [`current`]: EnumerationSession::current
/// [`advance`]: EnumerationSession::advance
#[derive(Debug, Clone)]
pub struct EnumerationSession {
    /// Ordered listing snapshot
    entries: Vec<NamespaceEntry>,
    /// Index of the next entry to examine
    cursor: usize,
    /// Index of the current entry, if any
    current: Option<usize>,
    /// Active filter; `None` until the host supplies one
    filter: Option<FileNameFilter>,
    /// Whether `current` refers to a matching entry
    valid: bool,
}

impl EnumerationSession {
    /// Create a session over an ordered listing.
    pub fn new(entries: Vec<NamespaceEntry>) -> Self {
        Self {
            entries,
            cursor: 0,
            current: None,
            filter: None,
            valid: false,
        }
    }

    /// Position on the first matching entry from the cursor. Returns validity.
    pub fn start(&mut self) -> bool {
        self.advance()
    }

    /// Move to the next matching entry. Returns validity.
    pub fn advance(&mut self) -> bool {
        while let Some(entry) = self.entries.get(self.cursor) {
            let index = self.cursor;
            self.cursor += 1;
            if self.is_match(entry) {
                self.current = Some(index);
                self.valid = true;
                return true;
            }
        }

        self.current = None;
        self.valid = false;
        false
    }

    /// Rewind to the beginning. The filter is kept; call [`start`](Self::start)
    /// to re-evaluate from the first entry.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// The current entry, defined only while the session is valid.
    pub fn current(&self) -> Option<&NamespaceEntry> {
        if !self.valid {
            return None;
        }
        self.current.and_then(|i| self.entries.get(i))
    }

    /// Whether the session is positioned on a matching entry.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// The active filter expression, if one has been set.
    pub fn filter(&self) -> Option<&str> {
        self.filter.as_ref().map(FileNameFilter::expression)
    }

    /// Replace the active filter. It stays in effect until replaced again.
    pub fn set_filter(&mut self, expression: &str) {
        self.filter = Some(FileNameFilter::new(expression));
    }

    /// Number of entries in the snapshot, regardless of the filter.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn is_match(&self, entry: &NamespaceEntry) -> bool {
        self.filter
            .as_ref()
            .map_or(true, |filter| filter.matches(entry.name()))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn files(names: &[&str]) -> Vec<NamespaceEntry> {
        names
            .iter()
            .map(|n| NamespaceEntry::File {
                name: n.to_string(),
                size: 1,
            })
            .collect()
    }

    fn drain(session: &mut EnumerationSession) -> Vec<String> {
        let mut names = Vec::new();
        while let Some(entry) = session.current() {
            names.push(entry.name().to_string());
            session.advance();
        }
        names
    }

    #[test]
    fn test_unstarted_session_has_no_current() {
        let session = EnumerationSession::new(files(&["a.txt"]));
        assert!(!session.is_valid());
        assert!(session.current().is_none());
        assert_eq!(session.filter(), None);
    }

    #[test]
    fn test_filter_then_reset_with_new_filter() {
        let mut session = EnumerationSession::new(files(&["a.txt", "b.lua", "c.txt"]));
        session.set_filter("*.txt");
        assert!(session.start());
        assert_eq!(drain(&mut session), ["a.txt", "c.txt"]);
        assert!(!session.is_valid());

        session.reset();
        session.set_filter("");
        assert!(session.start());
        assert_eq!(drain(&mut session), ["a.txt", "b.lua", "c.txt"]);
    }

    #[test]
    fn test_filter_is_sticky_across_reset() {
        let mut session = EnumerationSession::new(files(&["a.txt", "b.lua"]));
        session.set_filter("*.lua");
        session.start();
        session.reset();
        session.start();
        assert_eq!(session.filter(), Some("*.lua"));
        assert_eq!(drain(&mut session), ["b.lua"]);
    }

    #[test]
    fn test_no_match() {
        let mut session = EnumerationSession::new(files(&["a.txt", "b.txt"]));
        session.set_filter("*.png");
        assert!(!session.start());
        assert!(session.current().is_none());
    }

    #[test]
    fn test_advance_past_end_stays_invalid() {
        let mut session = EnumerationSession::new(files(&["only"]));
        assert!(session.start());
        assert!(!session.advance());
        assert!(!session.advance());
        assert!(session.current().is_none());
    }

    #[test]
    fn test_empty_listing() {
        let mut session = EnumerationSession::new(Vec::new());
        assert!(session.is_empty());
        assert!(!session.start());
    }
}
