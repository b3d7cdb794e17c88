//! Media storage for uploaded images.

mod local;
mod memory;

pub use local::LocalMediaStorage;
pub use memory::InMemoryMediaStorage;

use blogroll_core::validation::sniff_image;
use uuid::Uuid;

/// Used when the client-supplied name has nothing usable left.
const FALLBACK_STEM: &str = "image";

/// Keep only the last path component and replace anything outside
/// `[A-Za-z0-9._-]` with `_`. A name reduced to nothing or to dots becomes
/// `image.<ext>`, with the extension taken from the content.
fn sanitize_file_name(raw: &str, bytes: &[u8]) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.chars().all(|c| c == '.') {
        let ext = sniff_image(bytes).unwrap_or("bin");
        tracing::debug!(raw, ext, "Unusable upload name, using fallback");
        return format!("{FALLBACK_STEM}.{ext}");
    }
    cleaned
}

/// `cat.gif` -> `cat_1a2b3c4d.gif`.
fn with_random_suffix(name: &str) -> String {
    let simple = Uuid::new_v4().simple().to_string();
    let suffix = &simple[..8];
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}_{suffix}.{ext}"),
        _ => format!("{name}_{suffix}"),
    }
}

fn join_url(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_directories() {
        assert_eq!(sanitize_file_name("small.gif", b""), "small.gif");
        assert_eq!(sanitize_file_name("../../etc/passwd", b""), "passwd");
        assert_eq!(sanitize_file_name("C:\\tmp\\my cat.png", b""), "my_cat.png");
    }

    #[test]
    fn test_unusable_name_falls_back_to_content_type() {
        assert_eq!(sanitize_file_name("...", b"GIF89a rest"), "image.gif");
        assert_eq!(sanitize_file_name("dir/", b"\x89PNG\r\n\x1a\nrest"), "image.png");
        assert_eq!(sanitize_file_name("", b"plain"), "image.bin");
    }

    #[test]
    fn test_suffix_keeps_extension() {
        let renamed = with_random_suffix("small.gif");
        assert!(renamed.starts_with("small_"));
        assert!(renamed.ends_with(".gif"));
        assert_eq!(renamed.len(), "small_.gif".len() + 8);
    }

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("/media/", "posts/a.gif"), "/media/posts/a.gif");
        assert_eq!(join_url("/media", "posts/a.gif"), "/media/posts/a.gif");
    }
}
