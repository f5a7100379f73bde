//! Host-facing projection callbacks.
//!
//! A projection host (the OS component that intercepts filesystem calls)
//! drives the provider through [`ProjectionCallbacks`]. Every callback returns
//! a [`Status`]; errors never cross this boundary.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use std::sync::Arc;

use hashbrown::HashMap;
use pakfs_pak::PakArchive;
use parking_lot::Mutex;

use crate::{ContentAccessor, EnumerationSession, Error, NamespaceEntry, Result};

/// Opaque identifier the host assigns to a directory listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListingId(pub u128);

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

/// Result codes returned to the projection host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The operation succeeded.
    Ok,
    /// The path does not exist in the projection.
    FileNotFound,
    /// Not even one entry fit in the host's buffer.
    InsufficientBuffer,
    /// A staging buffer could not be allocated.
    OutOfMemory,
    /// The projection is read-only.
    AccessDenied,
    /// Any other failure, including archive I/O errors.
    InternalError,
}

impl Status {
    /// Whether this is [`Status::Ok`].
    #[inline]
    pub fn is_ok(self) -> bool {
        self == Status::Ok
    }
}

impl From<&Error> for Status {
    fn from(error: &Error) -> Self {
        match error {
            Error::NotFound(_) => Status::FileNotFound,
            Error::OutOfMemory(_) => Status::OutOfMemory,
            Error::Pak(_) | Error::ListingExists(_) | Error::ListingNotFound(_) => {
                Status::InternalError
            }
        }
    }
}

/// Placeholder information for one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    pub name: String,
    pub size: u64,
    pub is_directory: bool,
    pub read_only: bool,
}

impl From<&NamespaceEntry> for EntryInfo {
    fn from(entry: &NamespaceEntry) -> Self {
        Self {
            name: entry.name().to_string(),
            size: entry.size(),
            is_directory: entry.is_directory(),
            read_only: entry.is_read_only(),
        }
    }
}

/// Receives listing entries on behalf of the host.
pub trait EntrySink {
    /// Offer one entry. Returns `false` when there is no room for it.
    fn add(&mut self, entry: &EntryInfo) -> bool;
}

impl EntrySink for Vec<EntryInfo> {
    fn add(&mut self, entry: &EntryInfo) -> bool {
        self.push(entry.clone());
        true
    }
}

/// A sink that accepts at most `capacity` entries per page.
#[derive(Debug, Clone, Default)]
pub struct BoundedSink {
    capacity: usize,
    entries: Vec<EntryInfo>,
}

impl BoundedSink {
    /// Create a sink holding up to `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Take the entries collected so far, leaving the sink empty.
    pub fn take(&mut self) -> Vec<EntryInfo> {
        std::mem::take(&mut self.entries)
    }

    /// Entries collected so far.
    pub fn entries(&self) -> &[EntryInfo] {
        &self.entries
    }
}

impl EntrySink for BoundedSink {
    fn add(&mut self, entry: &EntryInfo) -> bool {
        if self.entries.len() >= self.capacity {
            return false;
        }
        self.entries.push(entry.clone());
        true
    }
}

/// The callbacks a projection host invokes.
pub trait ProjectionCallbacks {
    /// Start a listing of `path` under `id`.
    fn begin_listing(&self, id: ListingId, path: &str) -> Status;

    /// Hand entries of listing `id` to `sink` until it is full or the listing
    /// is exhausted. `filter` replaces the active filter on the first call and
    /// whenever `restart` is set.
    fn continue_listing(
        &self,
        id: ListingId,
        filter: Option<&str>,
        restart: bool,
        sink: &mut dyn EntrySink,
    ) -> Status;

    /// Discard listing `id`.
    fn end_listing(&self, id: ListingId) -> Status;

    /// Placeholder information for `path`.
    fn entry_info(&self, path: &str) -> std::result::Result<EntryInfo, Status>;

    /// Bytes `offset..offset + length` of the file at `path`.
    fn read_range(&self, path: &str, offset: u64, length: u64) -> std::result::Result<Vec<u8>, Status>;

    /// Notification that a consumer wants to delete `path`.
    fn pre_delete(&self, path: &str) -> Status;

    /// Notification that a consumer wants to rename `from` to `to`.
    fn pre_rename(&self, from: &str, to: &str) -> Status;
}

/// Provider configuration.
#[derive(Debug, Clone)]
pub struct ProviderOptions {
    /// Name of the synthetic metadata file in the root.
    pub metadata_name: String,
}

impl Default for ProviderOptions {
    fn default() -> Self {
        Self {
            metadata_name: "_metadata".to_string(),
        }
    }
}

type SessionMap = HashMap<ListingId, Arc<Mutex<EnumerationSession>>>;

/// Serves a pak archive to a projection host.
pub struct PakProvider<R = BufReader<File>> {
    content: ContentAccessor<R>,
    listings: Mutex<SessionMap>,
}

impl PakProvider {
    /// Open an archive from disk and prepare it for projection.
    pub fn open<P: AsRef<Path>>(path: P, options: ProviderOptions) -> Result<Self> {
        Self::new(PakArchive::open(path)?, options)
    }
}

impl<R: Read + Seek> PakProvider<R> {
    /// Prepare an open archive for projection.
    pub fn new(archive: PakArchive<R>, options: ProviderOptions) -> Result<Self> {
        let content = ContentAccessor::new(archive, &options.metadata_name)?;
        Ok(Self {
            content,
            listings: Mutex::new(HashMap::new()),
        })
    }

    /// Get the content accessor.
    pub fn content(&self) -> &ContentAccessor<R> {
        &self.content
    }

    /// Number of listings currently open.
    pub fn active_listings(&self) -> usize {
        self.listings.lock().len()
    }

    fn session(&self, id: ListingId) -> Result<Arc<Mutex<EnumerationSession>>> {
        self.listings
            .lock()
            .get(&id)
            .cloned()
            .ok_or(Error::ListingNotFound(id))
    }

    fn try_begin_listing(&self, id: ListingId, path: &str) -> Result<()> {
        let entries = self.content.namespace().list_sorted(path);
        let mut session = EnumerationSession::new(entries);
        session.start();

        let mut listings = self.listings.lock();
        if listings.contains_key(&id) {
            return Err(Error::ListingExists(id));
        }
        listings.insert(id, Arc::new(Mutex::new(session)));
        Ok(())
    }
}

impl<R: Read + Seek> ProjectionCallbacks for PakProvider<R> {
    fn begin_listing(&self, id: ListingId, path: &str) -> Status {
        match self.try_begin_listing(id, path) {
            Ok(()) => {
                tracing::debug!("Listing {} started for {}", id, path);
                Status::Ok
            }
            Err(e) => {
                tracing::warn!("Failed to start listing of {}: {}", path, e);
                Status::from(&e)
            }
        }
    }

    fn continue_listing(
        &self,
        id: ListingId,
        filter: Option<&str>,
        restart: bool,
        sink: &mut dyn EntrySink,
    ) -> Status {
        let session = match self.session(id) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("{}", e);
                return Status::from(&e);
            }
        };
        let mut session = session.lock();

        if restart || session.filter().is_none() {
            session.reset();
            session.set_filter(filter.unwrap_or(""));
            session.start();
        }

        let mut added = false;
        while let Some(entry) = session.current() {
            if !sink.add(&EntryInfo::from(entry)) {
                return if added {
                    Status::Ok
                } else {
                    Status::InsufficientBuffer
                };
            }
            added = true;
            session.advance();
        }

        Status::Ok
    }

    fn end_listing(&self, id: ListingId) -> Status {
        match self.listings.lock().remove(&id) {
            Some(_) => {
                tracing::debug!("Listing {} ended", id);
                Status::Ok
            }
            None => {
                tracing::warn!("{}", Error::ListingNotFound(id));
                Status::InternalError
            }
        }
    }

    fn entry_info(&self, path: &str) -> std::result::Result<EntryInfo, Status> {
        self.content
            .resolve(path)
            .map(|entry| EntryInfo::from(&entry))
            .map_err(|e| Status::from(&e))
    }

    fn read_range(&self, path: &str, offset: u64, length: u64) -> std::result::Result<Vec<u8>, Status> {
        self.content.read_bytes(path, offset, length).map_err(|e| {
            let status = Status::from(&e);
            if status == Status::InternalError || status == Status::OutOfMemory {
                tracing::warn!("Failed to read {} bytes of {} at {}: {}", length, path, offset, e);
            }
            status
        })
    }

    fn pre_delete(&self, _path: &str) -> Status {
        Status::AccessDenied
    }

    fn pre_rename(&self, _from: &str, _to: &str) -> Status {
        Status::AccessDenied
    }
}

impl<R> fmt::Debug for PakProvider<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PakProvider")
            .field("content", &self.content)
            .field("listings", &self.listings.lock().len())
            .finish()
    }
}
