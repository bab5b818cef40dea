//! Persisted configuration documents.
//!
//! Hearth persists platform state (mount points, permission grants) as
//! named JSON documents. The contract is deliberately coarse: a document
//! is read whole at manager init and rewritten whole on every mutation.
//! There is no partial update at this layer.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tokio::sync::Mutex;

use crate::error::{Error, Result};

/// Whole-document persisted configuration store.
///
/// Implementations decide where documents live (memory, disk, a synced
/// peer); callers only see named JSON documents.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Read a document, or `None` if it has never been saved.
    async fn load(&self, name: &str) -> Result<Option<JsonValue>>;

    /// Rewrite a document in full.
    async fn save(&self, name: &str, document: &JsonValue) -> Result<()>;

    /// Remove a document. Removing a missing document is not an error.
    async fn remove(&self, name: &str) -> Result<()>;
}

/// In-memory config store, used for tests and ephemeral hosts.
#[derive(Default)]
pub struct MemoryConfigStore {
    documents: Mutex<BTreeMap<String, JsonValue>>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn load(&self, name: &str) -> Result<Option<JsonValue>> {
        Ok(self.documents.lock().await.get(name).cloned())
    }

    async fn save(&self, name: &str, document: &JsonValue) -> Result<()> {
        self.documents
            .lock()
            .await
            .insert(name.to_string(), document.clone());
        Ok(())
    }

    async fn remove(&self, name: &str) -> Result<()> {
        self.documents.lock().await.remove(name);
        Ok(())
    }
}

/// Disk-backed config store keeping one `<name>.json` file per document.
///
/// Mutations rewrite the file whole; there is no journaling or fsync
/// discipline beyond what the OS provides.
pub struct DiskConfigStore {
    root: PathBuf,
}

impl DiskConfigStore {
    /// Open a store rooted at an existing writable directory.
    pub fn new(root: PathBuf) -> Result<Self> {
        let attr = fs::metadata(&root)
            .map_err(|err| Error::Config(format!("root path {}: {}", root.display(), err)))?;

        if !attr.is_dir() {
            return Err(Error::Config(format!(
                "root path {} must be a directory",
                root.display()
            )));
        }

        if attr.permissions().readonly() {
            return Err(Error::Config(format!(
                "root directory {} must be writable",
                root.display()
            )));
        }

        match root.canonicalize() {
            Ok(root) => Ok(DiskConfigStore { root }),
            Err(err) => Err(Error::Config(format!(
                "root path {}: {}",
                root.display(),
                err
            ))),
        }
    }

    fn document_path(&self, name: &str) -> Result<PathBuf> {
        // Document names are config keys like "system.mountPoints", never paths.
        if name.is_empty() || name.contains('/') || name.contains('\\') {
            return Err(Error::Config(format!("invalid document name '{}'", name)));
        }
        Ok(self.root.join(format!("{}.json", name)))
    }
}

#[async_trait]
impl ConfigStore for DiskConfigStore {
    async fn load(&self, name: &str) -> Result<Option<JsonValue>> {
        let path = self.document_path(name)?;
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(Error::Config(format!(
                    "reading {}: {}",
                    path.display(),
                    err
                )))
            }
        };
        Ok(Some(serde_json::from_str(&text)?))
    }

    async fn save(&self, name: &str, document: &JsonValue) -> Result<()> {
        let path = self.document_path(name)?;
        tracing::debug!(document = name, "rewriting config document");

        let text = serde_json::to_string_pretty(document)?;
        let mut file = fs::File::create(&path)
            .map_err(|err| Error::Config(format!("creating {}: {}", path.display(), err)))?;
        file.write_all(text.as_bytes())
            .map_err(|err| Error::Config(format!("writing {}: {}", path.display(), err)))?;
        Ok(())
    }

    async fn remove(&self, name: &str) -> Result<()> {
        let path = self.document_path(name)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(Error::Config(format!(
                "removing {}: {}",
                path.display(),
                err
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn memory_store_round_trip() {
        let store = MemoryConfigStore::new();
        assert_eq!(store.load("system.mountPoints").await.unwrap(), None);

        let doc = json!([{"src": "/a", "dest": "/b"}]);
        store.save("system.mountPoints", &doc).await.unwrap();
        assert_eq!(store.load("system.mountPoints").await.unwrap(), Some(doc));

        store.remove("system.mountPoints").await.unwrap();
        assert_eq!(store.load("system.mountPoints").await.unwrap(), None);
    }

    #[tokio::test]
    async fn memory_store_remove_missing_is_ok() {
        let store = MemoryConfigStore::new();
        store.remove("never.saved").await.unwrap();
    }

    #[tokio::test]
    async fn disk_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskConfigStore::new(dir.path().to_path_buf()).unwrap();

        let doc = json!({"app1": {"write|/data": true}});
        store.save("system.permissions", &doc).await.unwrap();

        assert_eq!(store.load("system.permissions").await.unwrap(), Some(doc));
        assert_eq!(store.load("system.mountPoints").await.unwrap(), None);

        store.remove("system.permissions").await.unwrap();
        assert_eq!(store.load("system.permissions").await.unwrap(), None);
    }

    #[tokio::test]
    async fn disk_store_rewrites_whole_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskConfigStore::new(dir.path().to_path_buf()).unwrap();

        store
            .save("doc", &json!({"a": 1, "b": 2}))
            .await
            .unwrap();
        store.save("doc", &json!({"a": 1})).await.unwrap();

        // The second save replaced the document, it did not merge.
        assert_eq!(store.load("doc").await.unwrap(), Some(json!({"a": 1})));
    }

    #[test]
    fn disk_store_rejects_missing_root() {
        let result = DiskConfigStore::new(PathBuf::from("/definitely/not/here"));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn disk_store_rejects_file_root() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a-file");
        fs::write(&file, b"x").unwrap();
        assert!(DiskConfigStore::new(file).is_err());
    }

    #[tokio::test]
    async fn disk_store_rejects_path_like_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskConfigStore::new(dir.path().to_path_buf()).unwrap();
        assert!(store.load("../escape").await.is_err());
        assert!(store.save("a/b", &json!(null)).await.is_err());
    }
}
