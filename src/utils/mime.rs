//! MIME type helpers for report uploads.

use std::path::Path;

/// Normalize a declared MIME type for comparison.
///
/// Lowercases and strips parameters, so `Image/PNG; charset=binary`
/// becomes `image/png`.
pub fn normalize_mime(mime: &str) -> String {
    mime.split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Guess the declared MIME type for a file from its extension.
///
/// Falls back to `application/octet-stream` for unknown extensions.
pub fn mime_from_path(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or("application/octet-stream")
        .to_string()
}

/// Map MIME type to file extension.
pub fn mime_to_extension(mime: &str) -> &'static str {
    match normalize_mime(mime).as_str() {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "application/pdf" => "pdf",
        "application/json" => "json",
        "text/plain" => "txt",
        _ => "bin",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_mime() {
        assert_eq!(normalize_mime("image/png"), "image/png");
        assert_eq!(normalize_mime("Image/PNG"), "image/png");
        assert_eq!(normalize_mime("image/png; charset=binary"), "image/png");
        assert_eq!(normalize_mime("  image/jpeg "), "image/jpeg");
        assert_eq!(normalize_mime(""), "");
    }

    #[test]
    fn test_mime_from_path() {
        assert_eq!(mime_from_path(Path::new("scan.png")), "image/png");
        assert_eq!(mime_from_path(Path::new("scan.JPG")), "image/jpeg");
        assert_eq!(mime_from_path(Path::new("report.pdf")), "application/pdf");
        assert_eq!(
            mime_from_path(Path::new("no_extension")),
            "application/octet-stream"
        );
    }

    #[test]
    fn test_mime_to_extension() {
        assert_eq!(mime_to_extension("image/jpeg"), "jpg");
        assert_eq!(mime_to_extension("image/jpg"), "jpg");
        assert_eq!(mime_to_extension("image/png"), "png");
        assert_eq!(mime_to_extension("application/x-unknown"), "bin");
    }
}
