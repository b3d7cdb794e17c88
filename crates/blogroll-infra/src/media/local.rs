//! Filesystem-backed media storage.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use blogroll_core::ports::{MediaError, MediaStorage};

use super::{join_url, sanitize_file_name, with_random_suffix};

/// Writes uploads under `root/<dir>/<file name>`.
pub struct LocalMediaStorage {
    root: PathBuf,
    base_url: String,
}

impl LocalMediaStorage {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl MediaStorage for LocalMediaStorage {
    async fn save(&self, dir: &str, file_name: &str, bytes: &[u8]) -> Result<String, MediaError> {
        let name = sanitize_file_name(file_name, bytes);
        let dir_path = self.root.join(dir);
        tokio::fs::create_dir_all(&dir_path)
            .await
            .map_err(|e| MediaError::Io(e.to_string()))?;

        let mut candidate = name.clone();
        loop {
            let path = dir_path.join(&candidate);
            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(mut file) => {
                    file.write_all(bytes)
                        .await
                        .map_err(|e| MediaError::Io(e.to_string()))?;
                    file.flush()
                        .await
                        .map_err(|e| MediaError::Io(e.to_string()))?;
                    break;
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    candidate = with_random_suffix(&name);
                }
                Err(e) => return Err(MediaError::Io(e.to_string())),
            }
        }

        tracing::debug!(dir, file = %candidate, size = bytes.len(), "Stored media file");
        Ok(format!("{dir}/{candidate}"))
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }
}
