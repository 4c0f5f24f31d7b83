//! File-Backed Blob Store
//!
//! Persists each slot as one file under a directory, giving the cache
//! durable state across process restarts without a database.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{StorageError, StorageResult};
use crate::storage::BlobStore;

// == File Blob Store ==
/// One file per slot under `dir`, named `<slot>.json`.
#[derive(Debug)]
pub struct FileBlobStore {
    dir: PathBuf,
}

impl FileBlobStore {
    // == Constructor ==
    /// Opens a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl AsRef<Path>) -> StorageResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .map_err(|err| StorageError::Io(dir.display().to_string(), err.to_string()))?;
        Ok(Self { dir })
    }

    fn slot_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }
}

impl BlobStore for FileBlobStore {
    fn read_slot(&self, name: &str) -> StorageResult<Option<String>> {
        match fs::read_to_string(self.slot_path(name)) {
            Ok(payload) => Ok(Some(payload)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StorageError::Io(name.to_string(), err.to_string())),
        }
    }

    fn write_slot(&mut self, name: &str, payload: &str) -> StorageResult<()> {
        fs::write(self.slot_path(name), payload)
            .map_err(|err| StorageError::Io(name.to_string(), err.to_string()))
    }

    fn delete_slot(&mut self, name: &str) -> StorageResult<()> {
        match fs::remove_file(self.slot_path(name)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StorageError::Io(name.to_string(), err.to_string())),
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_creates_directory() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("cache").join("blobs");

        let store = FileBlobStore::open(&nested).unwrap();

        assert!(nested.is_dir());
        assert_eq!(store.read_slot("anything").unwrap(), None);
    }

    #[test]
    fn test_write_then_read() {
        let tmp = TempDir::new().unwrap();
        let mut store = FileBlobStore::open(tmp.path()).unwrap();

        store.write_slot("entries", r#"{"a":1}"#).unwrap();

        assert_eq!(
            store.read_slot("entries").unwrap().as_deref(),
            Some(r#"{"a":1}"#)
        );
    }

    #[test]
    fn test_contents_survive_reopen() {
        let tmp = TempDir::new().unwrap();

        {
            let mut store = FileBlobStore::open(tmp.path()).unwrap();
            store.write_slot("entries", "persisted").unwrap();
        }

        let store = FileBlobStore::open(tmp.path()).unwrap();
        assert_eq!(
            store.read_slot("entries").unwrap().as_deref(),
            Some("persisted")
        );
    }

    #[test]
    fn test_delete_slot() {
        let tmp = TempDir::new().unwrap();
        let mut store = FileBlobStore::open(tmp.path()).unwrap();

        store.write_slot("entries", "payload").unwrap();
        store.delete_slot("entries").unwrap();

        assert_eq!(store.read_slot("entries").unwrap(), None);
        // Second delete is a no-op
        assert!(store.delete_slot("entries").is_ok());
    }
}
