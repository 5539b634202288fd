//! File-backed storage.
//!
//! All keys live in one JSON object. Every mutation rewrites the whole file
//! through a temp file + fsync + rename, so readers see either the old or the
//! new contents and a crash never leaves a torn file behind.

use crate::{SecureStorage, StorageError, StorageResult};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

type Entries = BTreeMap<String, String>;

/// JSON file storage with atomic replace.
pub struct FileStorage {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileStorage {
    /// Open storage at `path`, creating the parent directory if needed.
    /// The file itself is created on first write.
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let storage = Self {
            path: path.to_path_buf(),
            write_lock: Mutex::new(()),
        };
        // Fail early on a corrupt file rather than on first use.
        storage.read_entries()?;
        Ok(storage)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> StorageResult<Entries> {
        match fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(Entries::new()),
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                StorageError::Encoding(format!("{}: {}", self.path.display(), e))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Entries::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_entries(&self, entries: &Entries) -> StorageResult<()> {
        let dir = self
            .path
            .parent()
            .ok_or_else(|| StorageError::Backend(format!("invalid path: {}", self.path.display())))?;
        let payload =
            serde_json::to_vec_pretty(entries).map_err(|e| StorageError::Encoding(e.to_string()))?;

        let tmp_path = dir.join(format!(".session.tmp.{}", uuid::Uuid::new_v4()));

        let write_result = (|| -> std::io::Result<()> {
            let mut file = open_private(&tmp_path)?;
            file.write_all(&payload)?;
            file.sync_all()?;
            fs::rename(&tmp_path, &self.path)?;
            if let Ok(parent_dir) = fs::File::open(dir) {
                let _ = parent_dir.sync_all();
            }
            Ok(())
        })();

        if let Err(e) = write_result {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        debug!(path = %self.path.display(), keys = entries.len(), "Storage file replaced");
        Ok(())
    }
}

#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;
    fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    fs::OpenOptions::new().write(true).create_new(true).open(path)
}

impl SecureStorage for FileStorage {
    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let _guard = self.write_lock.lock();
        let mut entries = self.read_entries()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries)
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.read_entries()?.remove(key))
    }

    fn delete(&self, key: &str) -> StorageResult<bool> {
        let _guard = self.write_lock.lock();
        let mut entries = self.read_entries()?;
        if entries.remove(key).is_none() {
            return Ok(false);
        }
        self.write_entries(&entries)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_storage_persists_across_instances() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let storage = FileStorage::open(&path).unwrap();
        assert_eq!(storage.get("k").unwrap(), None);
        storage.set("k", "v").unwrap();
        storage.set("other", "w").unwrap();

        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(reopened.get("k").unwrap(), Some("v".to_string()));
        assert_eq!(reopened.get("other").unwrap(), Some("w".to_string()));
    }

    #[test]
    fn test_file_storage_delete() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::open(&dir.path().join("store.json")).unwrap();

        storage.set("k", "v").unwrap();
        assert!(storage.delete("k").unwrap());
        assert!(!storage.delete("k").unwrap());
        assert!(!storage.has("k").unwrap());
    }

    #[test]
    fn test_file_storage_leaves_no_temp_files() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::open(&dir.path().join("store.json")).unwrap();

        for i in 0..5 {
            storage.set("k", &i.to_string()).unwrap();
        }

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["store.json".to_string()]);
    }

    #[test]
    fn test_file_storage_rejects_corrupt_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "{not json").unwrap();

        assert!(matches!(
            FileStorage::open(&path),
            Err(StorageError::Encoding(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_file_storage_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        let storage = FileStorage::open(&path).unwrap();
        storage.set("k", "v").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
