//! Virtual file adapter collaborator interface.
//!
//! Hearth never issues OS file syscalls itself. Services and apps go
//! through a `FileAdapter`, which operates on already-resolved absolute
//! physical paths (mount-point substitution happens before a call lands
//! here, permission checks before that). Production hosts plug in an
//! adapter over their storage backend; tests plug in an in-memory one.

use async_trait::async_trait;

use crate::error::{PathFailure, Result};

/// Metadata for a single filesystem entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStat {
    pub size: u64,
    pub is_dir: bool,
    pub is_symlink: bool,
    /// Modification time, milliseconds since the epoch.
    pub mtime_ms: u64,
}

/// Access probe modes for [`FileAdapter::access`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileAccess {
    Exists,
    Readable,
    Writable,
}

/// The virtual filesystem collaborator.
///
/// All paths are absolute physical paths. Batch operations (`rm`, `cp`,
/// `rename`) must attempt every item and report partial failures as a
/// single collected [`crate::Error::Batch`] after all items settle.
#[async_trait]
pub trait FileAdapter: Send + Sync {
    // Reads
    async fn read_text_file(&self, path: &str) -> Result<String>;
    async fn read_bin_file(&self, path: &str) -> Result<Vec<u8>>;
    async fn stat(&self, path: &str) -> Result<FileStat>;
    async fn read_dir(&self, path: &str) -> Result<Vec<String>>;
    async fn read_link(&self, path: &str) -> Result<String>;
    async fn is_text_file_utf8(&self, path: &str) -> Result<bool>;
    async fn real_path(&self, path: &str) -> Result<String>;
    async fn glob(&self, pattern: &str) -> Result<Vec<String>>;
    async fn access(&self, path: &str, mode: FileAccess) -> Result<bool>;

    // Writes
    async fn append_file(&self, path: &str, data: &[u8]) -> Result<()>;
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()>;
    async fn rm(&self, paths: &[String]) -> Result<()>;
    async fn cp(&self, pairs: &[(String, String)]) -> Result<()>;
    async fn rename(&self, pairs: &[(String, String)]) -> Result<()>;
    async fn mkdir(&self, path: &str) -> Result<()>;
    async fn link(&self, target: &str, link_path: &str) -> Result<()>;
    async fn utimes(&self, path: &str, mtime_ms: u64) -> Result<()>;
    async fn truncate(&self, path: &str, len: u64) -> Result<()>;
    async fn chown(&self, path: &str, uid: u32, gid: u32) -> Result<()>;
    async fn chmod(&self, path: &str, mode: u32) -> Result<()>;
}

/// Collect per-item outcomes of a batch operation into one result.
///
/// Helper for adapter implementations: feed it `(path, outcome)` pairs
/// and it raises a single `Error::Batch` if anything failed.
pub fn settle_batch<I>(outcomes: I) -> Result<()>
where
    I: IntoIterator<Item = (String, Result<()>)>,
{
    let failures: Vec<PathFailure> = outcomes
        .into_iter()
        .filter_map(|(path, outcome)| {
            outcome.err().map(|error| PathFailure {
                path,
                error: error.to_string(),
            })
        })
        .collect();

    if failures.is_empty() {
        Ok(())
    } else {
        Err(crate::error::Error::Batch(failures))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn settle_batch_all_ok() {
        let outcomes = vec![
            ("/a".to_string(), Ok(())),
            ("/b".to_string(), Ok(())),
        ];
        assert!(settle_batch(outcomes).is_ok());
    }

    #[test]
    fn settle_batch_collects_failures() {
        let outcomes = vec![
            ("/a".to_string(), Ok(())),
            (
                "/b".to_string(),
                Err(Error::NotFound("/b".to_string())),
            ),
            (
                "/c".to_string(),
                Err(Error::Validation("bad".to_string())),
            ),
        ];

        match settle_batch(outcomes) {
            Err(Error::Batch(failures)) => {
                assert_eq!(failures.len(), 2);
                assert_eq!(failures[0].path, "/b");
                assert_eq!(failures[1].path, "/c");
            }
            other => panic!("expected batch error, got {:?}", other.err()),
        }
    }
}
