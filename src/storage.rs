//! Document storage for uploaded report images.
//!
//! The analysis path does not need this; it backs the alternate flow where
//! a report is stored first and referenced by URL.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::utils::mime_to_extension;

/// Errors from a document store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot build a URL for {0}")]
    InvalidPath(PathBuf),
}

/// Accepts a binary upload and returns a URL it can be retrieved from.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn put(&self, name: &str, mime_type: &str, content: &[u8]) -> Result<Url, StorageError>;
}

/// Compute the SHA-256 hex digest of content.
pub fn compute_hash(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}

/// Replace characters that are unsafe in filenames.
pub fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let trimmed = sanitized.trim().trim_matches('_');
    if trimmed.is_empty() {
        "report".to_string()
    } else {
        trimmed.chars().take(100).collect()
    }
}

/// Construct the storage path for content.
///
/// Two-level layout keyed by hash prefix:
/// `{root}/{hash[0..2]}/{sanitized_basename}-{hash[0..8]}.{extension}`
pub fn content_storage_path(
    root: &Path,
    content_hash: &str,
    name: &str,
    mime_type: &str,
) -> PathBuf {
    let basename = Path::new(name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let filename = format!(
        "{}-{}.{}",
        sanitize_filename(&basename),
        &content_hash[..8],
        mime_to_extension(mime_type)
    );
    root.join(&content_hash[..2]).join(filename)
}

/// Content-addressed store on the local filesystem, served as `file://` URLs.
#[derive(Debug, Clone)]
pub struct LocalDocumentStore {
    root: PathBuf,
}

impl LocalDocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl DocumentStore for LocalDocumentStore {
    async fn put(&self, name: &str, mime_type: &str, content: &[u8]) -> Result<Url, StorageError> {
        let hash = compute_hash(content);
        let path = content_storage_path(&self.root, &hash, name, mime_type);

        if tokio::fs::try_exists(&path).await? {
            debug!("{} already stored at {}", name, path.display());
        } else {
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&path, content).await?;
            info!("Stored {} at {}", name, path.display());
        }

        let absolute = tokio::fs::canonicalize(&path).await?;
        Url::from_file_path(&absolute).map_err(|_| StorageError::InvalidPath(absolute))
    }
}
