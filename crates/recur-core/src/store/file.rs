//! Local filesystem key-value store
//!
//! Each key maps to `<dir>/<key>.json`. Writes go to a temp file in the same
//! directory which is then renamed over the target, so readers only ever see
//! a complete document.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use super::KeyValueStore;
use crate::error::{Error, Result};

/// Key-value store keeping one JSON file per key
pub struct FileStore {
    /// Directory holding the documents
    dir: PathBuf,
}

impl FileStore {
    /// Create a new file store
    ///
    /// Creates the directory if it doesn't exist.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();

        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|e| {
                Error::Storage(format!(
                    "Failed to create store directory {}: {}",
                    dir.display(),
                    e
                ))
            })?;
            info!("Created store directory: {}", dir.display());
        }

        Ok(Self { dir })
    }

    /// Get the store directory path
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Get the full path for a key
    fn key_path(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(Error::Storage(format!("Invalid store key: {:?}", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn name(&self) -> &str {
        "file"
    }

    fn get(&self, key: &str) -> Result<Option<Value>> {
        let path = self.key_path(key)?;
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)?;
        let value = serde_json::from_str(&content)?;
        debug!("Read {} from {}", key, path.display());
        Ok(Some(value))
    }

    fn set(&self, key: &str, value: &Value) -> Result<()> {
        let path = self.key_path(key)?;

        let temp = NamedTempFile::new_in(&self.dir)?;
        {
            let mut writer = BufWriter::new(temp.as_file());
            serde_json::to_writer_pretty(&mut writer, value)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.persist(&path).map_err(|e| {
            Error::Storage(format!("Failed to write {}: {}", path.display(), e.error))
        })?;

        debug!("Wrote {} to {}", key, path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_creates_directory() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("nested").join("store");

        let store = FileStore::new(&dir).unwrap();
        assert!(dir.exists());
        assert_eq!(store.dir(), dir.as_path());
    }

    #[test]
    fn test_get_missing_key() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path()).unwrap();
        assert!(store.get("recurring_patterns").unwrap().is_none());
    }

    #[test]
    fn test_set_then_get() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path()).unwrap();

        store.set("patterns", &json!([{"id": "a"}])).unwrap();
        assert_eq!(store.get("patterns").unwrap(), Some(json!([{"id": "a"}])));
        assert!(tmp.path().join("patterns.json").exists());

        store.set("patterns", &json!([])).unwrap();
        assert_eq!(store.get("patterns").unwrap(), Some(json!([])));
    }

    #[test]
    fn test_persists_across_instances() {
        let tmp = TempDir::new().unwrap();
        FileStore::new(tmp.path())
            .unwrap()
            .set("k", &json!({"n": 1}))
            .unwrap();

        let reopened = FileStore::new(tmp.path()).unwrap();
        assert_eq!(reopened.get("k").unwrap(), Some(json!({"n": 1})));
    }

    #[test]
    fn test_corrupt_document_is_an_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("k.json"), "{not json").unwrap();

        let store = FileStore::new(tmp.path()).unwrap();
        assert!(matches!(store.get("k"), Err(Error::Json(_))));
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path()).unwrap();

        assert!(matches!(store.get("../escape"), Err(Error::Storage(_))));
        assert!(matches!(store.set("", &json!(1)), Err(Error::Storage(_))));
    }
}
