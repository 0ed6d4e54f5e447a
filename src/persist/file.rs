//! Implements `KeyValueStore` as one JSON file per key in a directory.

use crate::persist::KeyValueStore;
use crate::{utils, Result};
use anyhow::ensure;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Stores the value of `key` in `<dir>/<key>.json`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// `dir` must already exist.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> Result<PathBuf> {
        ensure!(
            !key.is_empty()
                && key
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
                && !key.starts_with('.'),
            "Invalid storage key '{key}'"
        );
        Ok(self.dir.join(format!("{key}.json")))
    }
}

#[async_trait::async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path(key)?;
        trace!("get {}", path.display());
        if !path.is_file() {
            return Ok(None);
        }
        utils::read(&path).await.map(Some)
    }

    async fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.path(key)?;
        trace!("set {}", path.display());
        // Readers only ever see the previous or the new file, never a partial one.
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        utils::write(&tmp, value).await?;
        utils::rename(&tmp, &path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_get_missing() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        assert_eq!(store.get("projects").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::new(dir.path());
        store.set("lastProjectId", "\"proj-1\"").await.unwrap();
        store.set("lastProjectId", "\"proj-2\"").await.unwrap();
        assert_eq!(
            store.get("lastProjectId").await.unwrap().as_deref(),
            Some("\"proj-2\"")
        );
        assert!(dir.path().join("lastProjectId.json").is_file());
        assert!(!dir.path().join(".lastProjectId.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_rejects_path_like_keys() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::new(dir.path());
        assert!(store.set("../escape", "x").await.is_err());
        assert!(store.set("", "x").await.is_err());
        assert!(store.get(".hidden").await.is_err());
    }
}
