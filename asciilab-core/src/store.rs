//! Key-value persistence for the ledger (made by FontLab https://www.fontlab.com/)

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use tokio::fs;

/// Trait for the tiny key-value store favorites and history live in.
///
/// Both calls are suspension points; a store must not block the thread.
#[allow(async_fn_in_trait)]
pub trait KeyValueStore {
    /// `Ok(None)` when nothing has been stored under `key` yet.
    async fn read(&self, key: &str) -> Result<Option<String>>;
    async fn write(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Process-local store, handy for tests and throwaway sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(mut self, key: &str, value: &str) -> Self {
        self.records.insert(key.to_string(), value.to_string());
        self
    }

    pub fn record(&self, key: &str) -> Option<&str> {
        self.records.get(key).map(String::as_str)
    }
}

impl KeyValueStore for MemoryStore {
    async fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.records.get(key).cloned())
    }

    async fn write(&mut self, key: &str, value: &str) -> Result<()> {
        self.records.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One `<key>.json` file per record inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(anyhow!("invalid record key: {key:?}"));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    async fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err).with_context(|| format!("reading {}", path.display())),
        }
    }

    async fn write(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("creating {}", self.dir.display()))?;

        // Records are replaced whole via a sibling temp file.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)
            .await
            .with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &path)
            .await
            .with_context(|| format!("replacing {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn file_store_round_trips_records() {
        let tmp = tempdir().expect("tempdir");
        let mut store = FileStore::new(tmp.path().join("state"));

        assert_eq!(store.read("history").await.expect("read"), None);
        store.write("history", "[1,2]").await.expect("write");
        assert_eq!(
            store.read("history").await.expect("read").as_deref(),
            Some("[1,2]")
        );
        assert!(tmp.path().join("state/history.json").exists());
        assert!(!tmp.path().join("state/history.json.tmp").exists());
    }

    #[tokio::test]
    async fn file_store_rejects_path_like_keys() {
        let tmp = tempdir().expect("tempdir");
        let mut store = FileStore::new(tmp.path());
        assert!(store.write("../escape", "x").await.is_err());
        assert!(store.read("").await.is_err());
    }
}
