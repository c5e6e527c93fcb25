//! The blob store seam used by the gateway

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::StoreError;

/// Content type used when a client does not declare one
pub const DEFAULT_CONTENT_TYPE: &str = "image/png";

/// Options for PUT operations
#[derive(Debug, Clone)]
pub struct PutOptions {
    /// Content type stored alongside the object
    pub content_type: String,
    /// Replace an existing object at the same path
    pub upsert: bool,
}

impl Default for PutOptions {
    fn default() -> Self {
        Self {
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            upsert: false,
        }
    }
}

impl PutOptions {
    /// Options for a write that must not replace an existing object
    pub fn create_only(content_type: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            upsert: false,
        }
    }
}

/// Object storage addressed by path, with a public URL per object.
///
/// Implementations hold only read-only configuration and a client handle,
/// so a single instance is shared across all requests.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Short backend identifier used in logs
    fn backend_name(&self) -> &'static str;

    /// Store `body` at `path`. With `upsert == false` an existing object
    /// makes the call fail instead of being replaced.
    async fn put(&self, path: &str, body: Bytes, options: PutOptions) -> Result<(), StoreError>;

    /// Directly fetchable URL for the object at `path`
    fn public_url(&self, path: &str) -> String;

    /// Remove objects. Missing objects are not an error.
    async fn delete(&self, paths: &[String]) -> Result<(), StoreError>;
}
