use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::error::Result;

/// Where the offset document lives between runs.
pub trait DocumentStore {
    /// Time of the last write to the stored document.
    fn last_modified(&self) -> Result<DateTime<Utc>>;

    /// Read the full document. A store without a document returns no bytes.
    fn load(&self) -> Result<Vec<u8>>;

    /// Replace the stored document with `bytes`.
    fn save(&self, bytes: &[u8]) -> Result<()>;
}

/// Document stored as a file on disk.
///
/// A missing file reads as an empty document last modified at the Unix epoch.
#[derive(Debug, Clone)]
pub struct FileDocumentStore {
    path: PathBuf,
}

impl FileDocumentStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DocumentStore for FileDocumentStore {
    fn last_modified(&self) -> Result<DateTime<Utc>> {
        match fs::metadata(&self.path) {
            Ok(metadata) => Ok(DateTime::<Utc>::from(metadata.modified()?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(DateTime::<Utc>::UNIX_EPOCH),
            Err(e) => Err(e.into()),
        }
    }

    fn load(&self) -> Result<Vec<u8>> {
        match fs::read(&self.path) {
            Ok(bytes) => {
                debug!("Read {} bytes from {}", bytes.len(), self.path.display());
                Ok(bytes)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Offset document {} not found", self.path.display());
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, bytes: &[u8]) -> Result<()> {
        fs::write(&self.path, bytes)?;
        info!("Saved offset document to {}", self.path.display());
        Ok(())
    }
}

#[derive(Debug)]
struct StoredDocument {
    bytes: Vec<u8>,
    modified: DateTime<Utc>,
    saves: usize,
}

/// Document held in memory, for embedding and tests.
#[derive(Debug)]
pub struct MemoryDocumentStore {
    inner: Mutex<StoredDocument>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::with_bytes(Vec::new())
    }

    pub fn with_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            inner: Mutex::new(StoredDocument {
                bytes: bytes.into(),
                modified: DateTime::<Utc>::UNIX_EPOCH,
                saves: 0,
            }),
        }
    }

    /// Replace the document as an outside editor would, bumping its timestamp.
    pub fn edit(&self, bytes: impl Into<Vec<u8>>) {
        let mut inner = self.inner.lock();
        inner.bytes = bytes.into();
        inner.modified = next_timestamp(inner.modified);
    }

    pub fn set_modified(&self, modified: DateTime<Utc>) {
        self.inner.lock().modified = modified;
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.inner.lock().bytes.clone()
    }

    /// Number of `save` calls served so far
    pub fn save_count(&self) -> usize {
        self.inner.lock().saves
    }
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn last_modified(&self) -> Result<DateTime<Utc>> {
        Ok(self.inner.lock().modified)
    }

    fn load(&self) -> Result<Vec<u8>> {
        Ok(self.inner.lock().bytes.clone())
    }

    fn save(&self, bytes: &[u8]) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.bytes = bytes.to_vec();
        inner.modified = next_timestamp(inner.modified);
        inner.saves += 1;
        Ok(())
    }
}

/// Current time, but always strictly after `previous`.
fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::milliseconds(1)
    }
}
