//! In-memory blob store for tests and local runs

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use crate::error::{StoreError, ALREADY_EXISTS_MESSAGE};
use crate::traits::{BlobStore, PutOptions};

/// A stored object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub content_type: String,
    pub body: Bytes,
}

/// Injected failure: applies to every operation, or only to paths
/// containing `fragment`
#[derive(Debug, Clone)]
struct FailureRule {
    fragment: Option<String>,
    message: String,
}

impl FailureRule {
    fn matches(&self, path: &str) -> bool {
        self.fragment
            .as_deref()
            .map_or(true, |fragment| path.contains(fragment))
    }
}

/// Blob store that keeps objects in a map.
///
/// Honours the no-overwrite flag like a real backend, and can be told to
/// fail so error paths can be exercised without a network.
pub struct MemoryStore {
    base_url: String,
    objects: RwLock<HashMap<String, StoredBlob>>,
    failures: RwLock<Vec<FailureRule>>,
}

impl MemoryStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            objects: RwLock::new(HashMap::new()),
            failures: RwLock::new(Vec::new()),
        }
    }

    /// Make every subsequent operation fail with `message`
    pub async fn fail_with(&self, message: impl Into<String>) {
        self.failures.write().await.push(FailureRule {
            fragment: None,
            message: message.into(),
        });
    }

    /// Make operations on paths containing `fragment` fail with `message`
    pub async fn fail_paths_containing(
        &self,
        fragment: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.failures.write().await.push(FailureRule {
            fragment: Some(fragment.into()),
            message: message.into(),
        });
    }

    /// Remove all injected failures
    pub async fn clear_failures(&self) {
        self.failures.write().await.clear();
    }

    pub async fn get(&self, path: &str) -> Option<StoredBlob> {
        self.objects.read().await.get(path).cloned()
    }

    pub async fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.objects.read().await.keys().cloned().collect();
        paths.sort();
        paths
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }

    async fn injected_failure(&self, path: &str) -> Option<StoreError> {
        self.failures
            .read()
            .await
            .iter()
            .find(|rule| rule.matches(path))
            .map(|rule| StoreError::backend(500, rule.message.clone()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new("memory://blobs")
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn put(&self, path: &str, body: Bytes, options: PutOptions) -> Result<(), StoreError> {
        if let Some(err) = self.injected_failure(path).await {
            return Err(err);
        }

        let mut objects = self.objects.write().await;
        if !options.upsert && objects.contains_key(path) {
            return Err(StoreError::already_exists(path, ALREADY_EXISTS_MESSAGE));
        }

        objects.insert(
            path.to_string(),
            StoredBlob {
                content_type: options.content_type,
                body,
            },
        );
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn delete(&self, paths: &[String]) -> Result<(), StoreError> {
        for path in paths {
            if let Some(err) = self.injected_failure(path).await {
                return Err(err);
            }
        }

        let mut objects = self.objects.write().await;
        for path in paths {
            objects.remove(path);
        }
        Ok(())
    }
}
