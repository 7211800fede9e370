//! Type and size policy for report uploads.
//!
//! Validation trusts the declared MIME type. It is advisory for the user,
//! not a security boundary: the analysis service does its own checks.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use thiserror::Error;

use crate::utils::{format_size, mime_from_path, normalize_mime};

/// Largest accepted upload (10 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// MIME types the analysis service accepts.
pub const ACCEPTED_MIME_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png"];

/// Errors raised when a selected file does not meet upload policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Unsupported file type: {mime_type} (expected JPEG or PNG)")]
    UnsupportedType { mime_type: String },

    #[error(
        "File too large: {} exceeds the {} limit",
        size_text(.size_bytes),
        size_text(.limit_bytes)
    )]
    TooLarge { size_bytes: u64, limit_bytes: u64 },
}

/// A file on disk could not be turned into a [`CandidateFile`].
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Rejected from its metadata, before the content was read.
    #[error(transparent)]
    Rejected(#[from] ValidationError),
}

fn size_text(bytes: &u64) -> String {
    format_size(*bytes)
}

/// A file as selected by the user, before any policy check.
///
/// File pickers, drag-and-drop payloads and paths on disk all produce one
/// of these so they share a single validation path.
#[derive(Debug, Clone)]
pub struct CandidateFile {
    pub name: String,
    /// MIME type as declared by the source (browser, OS, or extension).
    pub mime_type: String,
    pub content: Bytes,
}

impl CandidateFile {
    pub fn new(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        content: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            content: content.into(),
        }
    }

    /// Read a file from disk, declaring its MIME type from the extension.
    ///
    /// Type and size are checked against the file's metadata first, so a
    /// file that would be rejected is never loaded into memory.
    pub async fn from_path(path: &Path) -> Result<Self, ReadError> {
        let io_err = |source| ReadError::Io {
            path: path.to_path_buf(),
            source,
        };

        let mime_type = mime_from_path(path);
        let size_bytes = tokio::fs::metadata(path).await.map_err(io_err)?.len();
        check_policy(&mime_type, size_bytes)?;

        let content = tokio::fs::read(path).await.map_err(io_err)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        Ok(Self::new(name, mime_type, content))
    }

    pub fn size_bytes(&self) -> u64 {
        self.content.len() as u64
    }
}

/// A file that passed validation and may be submitted for analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadCandidate {
    name: String,
    mime_type: String,
    size_bytes: u64,
    content: Bytes,
}

impl UploadCandidate {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Normalized MIME type (lowercase, no parameters).
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// File content. Cloning is cheap; the buffer is shared.
    pub fn content(&self) -> Bytes {
        self.content.clone()
    }
}

/// Type check, then size check. Returns the normalized MIME type.
fn check_policy(mime_type: &str, size_bytes: u64) -> Result<String, ValidationError> {
    let normalized = normalize_mime(mime_type);
    if !ACCEPTED_MIME_TYPES.contains(&normalized.as_str()) {
        return Err(ValidationError::UnsupportedType {
            mime_type: mime_type.to_string(),
        });
    }

    if size_bytes > MAX_UPLOAD_BYTES {
        return Err(ValidationError::TooLarge {
            size_bytes,
            limit_bytes: MAX_UPLOAD_BYTES,
        });
    }

    Ok(normalized)
}

/// Check a selected file against type and size policy.
///
/// The type check runs first, so an oversized PDF reports `UnsupportedType`.
pub fn validate(file: CandidateFile) -> Result<UploadCandidate, ValidationError> {
    let size_bytes = file.size_bytes();
    let mime_type = check_policy(&file.mime_type, size_bytes)?;

    Ok(UploadCandidate {
        name: file.name,
        mime_type,
        size_bytes,
        content: file.content,
    })
}
