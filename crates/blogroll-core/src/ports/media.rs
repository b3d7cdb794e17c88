//! Media storage port for uploaded post images.

use async_trait::async_trait;

/// Storage for user-uploaded files.
#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Store `bytes` under `dir`, returning the relative path actually used
    /// (for example `posts/cat.gif`, or `posts/cat_1a2b3c4d.gif` on collision).
    async fn save(&self, dir: &str, file_name: &str, bytes: &[u8]) -> Result<String, MediaError>;

    /// Public URL for a stored relative path.
    fn url(&self, path: &str) -> String;
}

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("Storage I/O failed: {0}")]
    Io(String),
}
