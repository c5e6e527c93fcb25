//! Supabase Storage backend
//!
//! Talks to the Storage REST API directly:
//! - upload: `POST {url}/storage/v1/object/{bucket}/{path}`
//! - remove: `DELETE {url}/storage/v1/object/{bucket}` with `{"prefixes": [...]}`
//! - public: `{url}/storage/v1/object/public/{bucket}/{path}`

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{StoreError, ALREADY_EXISTS_MESSAGE};
use crate::traits::{BlobStore, PutOptions};

/// Default request timeout for storage calls
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for a Supabase project
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://abc.supabase.co`
    pub url: String,
    /// Service or anon key, sent as both `apikey` and bearer token
    pub key: String,
    /// Target bucket
    pub bucket: String,
    pub timeout: Duration,
}

impl SupabaseConfig {
    pub fn new(url: impl Into<String>, key: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            key: key.into(),
            bucket: bucket.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }
}

/// Error body returned by the Storage API
#[derive(Debug, Default, Deserialize)]
struct StorageErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct RemoveRequest<'a> {
    prefixes: &'a [String],
}

/// Blob store backed by Supabase Storage
pub struct SupabaseStore {
    client: Client,
    config: SupabaseConfig,
}

impl SupabaseStore {
    /// Create a new store; fails only if the HTTP client cannot be built
    pub fn new(config: SupabaseConfig) -> Result<Self, StoreError> {
        if config.bucket.is_empty() {
            return Err(StoreError::Config("bucket name must not be empty".to_string()));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StoreError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn bucket(&self) -> &str {
        &self.config.bucket
    }

    fn object_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.config.base_url(),
            urlencoding::encode(&self.config.bucket),
            encode_path(path)
        )
    }

    fn bucket_url(&self) -> String {
        format!(
            "{}/storage/v1/object/{}",
            self.config.base_url(),
            urlencoding::encode(&self.config.bucket)
        )
    }

    /// Turn a non-success response into a `StoreError`
    async fn check_response(response: Response, path: &str) -> Result<(), StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let text = response.text().await.unwrap_or_default();
        let body: StorageErrorBody = serde_json::from_str(&text).unwrap_or_default();

        // Storage reports duplicates either as HTTP 409 or as a 400 with error "Duplicate"
        if status == StatusCode::CONFLICT || body.error.as_deref() == Some("Duplicate") {
            let message = body
                .message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| ALREADY_EXISTS_MESSAGE.to_string());
            return Err(StoreError::already_exists(path, message));
        }

        let message = body
            .message
            .or(body.error)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| {
                if text.is_empty() {
                    status.to_string()
                } else {
                    text
                }
            });

        Err(StoreError::backend(status.as_u16(), message))
    }
}

#[async_trait]
impl BlobStore for SupabaseStore {
    fn backend_name(&self) -> &'static str {
        "supabase"
    }

    async fn put(&self, path: &str, body: Bytes, options: PutOptions) -> Result<(), StoreError> {
        let url = self.object_url(path);
        debug!("PUT {} ({} bytes, {})", url, body.len(), options.content_type);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.key)
            .header("apikey", &self.config.key)
            .header(CONTENT_TYPE, &options.content_type)
            .header("x-upsert", if options.upsert { "true" } else { "false" })
            .body(body)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        Self::check_response(response, path).await
    }

    fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.config.base_url(),
            urlencoding::encode(&self.config.bucket),
            encode_path(path)
        )
    }

    async fn delete(&self, paths: &[String]) -> Result<(), StoreError> {
        if paths.is_empty() {
            return Ok(());
        }

        let url = self.bucket_url();
        debug!("DELETE {} {:?}", url, paths);

        let response = self
            .client
            .delete(&url)
            .bearer_auth(&self.config.key)
            .header("apikey", &self.config.key)
            .json(&RemoveRequest { prefixes: paths })
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        Self::check_response(response, &paths.join(",")).await
    }
}

/// Percent-encode each segment of an object path, keeping `/` separators
fn encode_path(path: &str) -> String {
    path.trim_start_matches('/')
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
