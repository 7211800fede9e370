//! Shared utility functions.
//!
//! - `format`: Human-readable formatting (sizes)
//! - `mime`: MIME type normalization and extension mapping

mod format;
mod mime;

pub use format::format_size;
pub use mime::{mime_from_path, mime_to_extension, normalize_mime};
