//! In-memory media storage - used in tests and throwaway runs.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use blogroll_core::ports::{MediaError, MediaStorage};

use super::{join_url, sanitize_file_name, with_random_suffix};

pub struct InMemoryMediaStorage {
    files: RwLock<HashMap<String, Vec<u8>>>,
    base_url: String,
}

impl InMemoryMediaStorage {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            files: RwLock::new(HashMap::new()),
            base_url: base_url.into(),
        }
    }

    /// Stored bytes for a relative path.
    pub async fn get(&self, path: &str) -> Option<Vec<u8>> {
        self.files.read().await.get(path).cloned()
    }
}

#[async_trait]
impl MediaStorage for InMemoryMediaStorage {
    async fn save(&self, dir: &str, file_name: &str, bytes: &[u8]) -> Result<String, MediaError> {
        let name = sanitize_file_name(file_name, bytes);
        let mut files = self.files.write().await;

        let mut path = format!("{dir}/{name}");
        while files.contains_key(&path) {
            path = format!("{dir}/{}", with_random_suffix(&name));
        }
        files.insert(path.clone(), bytes.to_vec());
        Ok(path)
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }
}
