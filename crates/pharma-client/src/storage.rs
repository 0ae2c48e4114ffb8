//! # File Storage
//!
//! `CartStorage` backed by one JSON file per key under the data directory.
//!
//! ```text
//! <data_dir>/
//! └── cart.json      ← { "items": [...], "total": 42.5 }
//! ```
//!
//! Writes go to a temporary sibling first and are renamed into place, so a
//! crash mid-write leaves the previous cart intact.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use pharma_core::{CartStorage, StorageError};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Uses `dir`, creating it when missing.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| StorageError::WriteFailed {
            key: dir.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(FileStorage { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Option<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        valid.then(|| self.dir.join(format!("{}.json", key)))
    }
}

impl CartStorage for FileStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key).ok_or_else(|| StorageError::ReadFailed {
            key: key.to_string(),
            reason: "invalid key".to_string(),
        })?;

        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::ReadFailed {
                key: key.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key).ok_or_else(|| StorageError::WriteFailed {
            key: key.to_string(),
            reason: "invalid key".to_string(),
        })?;
        let tmp = path.with_extension("json.tmp");

        let write_failed = |e: std::io::Error| StorageError::WriteFailed {
            key: key.to_string(),
            reason: e.to_string(),
        };
        fs::write(&tmp, value).map_err(write_failed)?;
        fs::rename(&tmp, &path).map_err(write_failed)?;

        debug!(?path, bytes = value.len(), "Persisted state");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pharma_core::{CartItem, CartStore, Money};
    use tempfile::TempDir;

    #[test]
    fn test_missing_key_loads_none() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();
        assert_eq!(storage.load("cart").unwrap(), None);
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::open(dir.path().join("nested")).unwrap();
        storage.save("cart", r#"{"items":[]}"#).unwrap();

        assert!(dir.path().join("nested").join("cart.json").exists());
        assert_eq!(storage.load("cart").unwrap().as_deref(), Some(r#"{"items":[]}"#));
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();
        assert!(storage.save("../escape", "x").is_err());
        assert!(storage.load("").is_err());
    }

    #[test]
    fn test_cart_survives_restart() {
        let dir = TempDir::new().unwrap();
        {
            let storage = FileStorage::open(dir.path()).unwrap();
            let mut store = CartStore::open(storage).unwrap();
            store
                .add_item(CartItem::new("vit-d", "Vitamin D", Money::from_cents(899), 2))
                .unwrap();
        }

        let store = CartStore::open(FileStorage::open(dir.path()).unwrap()).unwrap();
        assert_eq!(store.state().items().len(), 1);
        assert_eq!(store.state().total(), Money::from_cents(1798));
    }

    #[test]
    fn test_corrupt_file_opens_empty_cart() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("cart.json"), "{ not json").unwrap();

        let store = CartStore::open(FileStorage::open(dir.path()).unwrap()).unwrap();
        assert!(store.state().is_empty());
    }
}
