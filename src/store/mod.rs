//! Document storage
//!
//! Persists extracted documents to domain-scoped folders:
//! `<root>/<domain bucket>/<file key>.md`. Writes are idempotent
//! overwrites; bucket directories are created lazily and tolerate
//! concurrent creation by parallel workers.

use crate::url::{document_file_name, domain_bucket};
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

/// Storage-specific errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to create bucket directory {path}: {source}")]
    CreateBucket {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write document {path}: {source}")]
    WriteDocument {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Storage backend for extracted documents
///
/// The trait exists so tests can substitute an in-memory store; the
/// filesystem implementation is the production backend.
pub trait DocumentStore {
    /// Writes a document, overwriting any previous version at the same path
    fn persist(&self, url: &Url, document: &str) -> Result<PathBuf, StoreError>;

    /// Whether a document for this URL already exists
    fn exists(&self, url: &Url) -> bool;

    /// The path a document for this URL would be written to
    fn path_for(&self, url: &Url) -> PathBuf;
}

/// Filesystem-backed document store
pub struct FsDocumentStore {
    root: PathBuf,
}

impl FsDocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The bucket directory a URL's documents live in
    pub fn bucket_dir(&self, url: &Url) -> PathBuf {
        self.root.join(domain_bucket(url))
    }
}

impl DocumentStore for FsDocumentStore {
    fn persist(&self, url: &Url, document: &str) -> Result<PathBuf, StoreError> {
        let bucket = self.bucket_dir(url);

        // create_dir_all is idempotent; concurrent workers creating the
        // same bucket must not fail.
        std::fs::create_dir_all(&bucket).map_err(|source| StoreError::CreateBucket {
            path: bucket.clone(),
            source,
        })?;

        let path = bucket.join(document_file_name(url));
        std::fs::write(&path, document).map_err(|source| StoreError::WriteDocument {
            path: path.clone(),
            source,
        })?;

        tracing::debug!("Persisted {} -> {}", url, path.display());
        Ok(path)
    }

    fn exists(&self, url: &Url) -> bool {
        self.path_for(url).exists()
    }

    fn path_for(&self, url: &Url) -> PathBuf {
        self.bucket_dir(url).join(document_file_name(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, FsDocumentStore) {
        let dir = TempDir::new().unwrap();
        let store = FsDocumentStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn test_persist_creates_bucket_lazily() {
        let (dir, store) = store();
        let url = Url::parse("https://example.com/a/b").unwrap();

        let path = store.persist(&url, "# Hello").unwrap();

        assert_eq!(path, dir.path().join("example.com").join("a_b.md"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# Hello");
    }

    #[test]
    fn test_persist_overwrites_in_place() {
        let (_dir, store) = store();
        let url = Url::parse("https://example.com/page").unwrap();

        let first = store.persist(&url, "old").unwrap();
        let second = store.persist(&url, "new").unwrap();

        assert_eq!(first, second);
        assert_eq!(std::fs::read_to_string(&second).unwrap(), "new");
    }

    #[test]
    fn test_exists() {
        let (_dir, store) = store();
        let url = Url::parse("https://example.com/page").unwrap();

        assert!(!store.exists(&url));
        store.persist(&url, "content").unwrap();
        assert!(store.exists(&url));
    }

    #[test]
    fn test_port_bucket_is_sanitized() {
        let (dir, store) = store();
        let url = Url::parse("http://localhost:8080/docs/intro").unwrap();

        let path = store.persist(&url, "x").unwrap();
        assert_eq!(
            path,
            dir.path().join("localhost_8080").join("docs_intro.md")
        );
    }

    #[test]
    fn test_root_url_maps_to_index() {
        let (dir, store) = store();
        let url = Url::parse("https://example.com/").unwrap();

        let path = store.persist(&url, "home").unwrap();
        assert_eq!(path, dir.path().join("example.com").join("index.md"));
    }
}
