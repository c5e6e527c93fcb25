//! S3-compatible backend (RustFS, MinIO, AWS S3)

use async_trait::async_trait;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::config::retry::RetryConfig;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;
use tracing::debug;

use crate::error::StoreError;
use crate::traits::{BlobStore, PutOptions};

/// Connection settings for an S3-compatible endpoint
#[derive(Debug, Clone)]
pub struct S3Config {
    /// Endpoint URL, e.g. `http://localhost:9000`
    pub endpoint: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    /// Base URL that serves objects publicly. Falls back to a path-style
    /// `{endpoint}/{bucket}` URL when unset.
    pub public_base_url: Option<String>,
}

/// Blob store backed by an S3 bucket
pub struct S3Store {
    client: Client,
    config: S3Config,
}

impl S3Store {
    pub fn new(config: S3Config) -> Result<Self, StoreError> {
        if config.bucket.is_empty() {
            return Err(StoreError::Config("bucket name must not be empty".to_string()));
        }
        if config.endpoint.is_empty() {
            return Err(StoreError::Config("S3 endpoint must not be empty".to_string()));
        }

        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "pixgate",
        );

        let sdk_config = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .endpoint_url(&config.endpoint)
            .force_path_style(true)
            .credentials_provider(credentials)
            // A retried conditional PUT would see its own first attempt as a conflict
            .retry_config(RetryConfig::disabled())
            .build();

        Ok(Self {
            client: Client::from_conf(sdk_config),
            config,
        })
    }
}

#[async_trait]
impl BlobStore for S3Store {
    fn backend_name(&self) -> &'static str {
        "s3"
    }

    async fn put(&self, path: &str, body: Bytes, options: PutOptions) -> Result<(), StoreError> {
        let key = path.trim_start_matches('/');
        debug!("PUT s3://{}/{} ({} bytes)", self.config.bucket, key, body.len());

        let mut request = self
            .client
            .put_object()
            .bucket(&self.config.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(&options.content_type);

        // Conditional write: the server answers 412 if the key is taken
        if !options.upsert {
            request = request.if_none_match("*");
        }

        request.send().await.map_err(|e| match store_error(&e) {
            StoreError::Backend {
                status: 409 | 412,
                message,
            } => StoreError::already_exists(path, message),
            other => other,
        })?;

        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        let key = path.trim_start_matches('/');
        match &self.config.public_base_url {
            Some(base) => format!("{}/{}", base.trim_end_matches('/'), key),
            None => format!(
                "{}/{}/{}",
                self.config.endpoint.trim_end_matches('/'),
                self.config.bucket,
                key
            ),
        }
    }

    async fn delete(&self, paths: &[String]) -> Result<(), StoreError> {
        for path in paths {
            let key = path.trim_start_matches('/');
            debug!("DELETE s3://{}/{}", self.config.bucket, key);

            // S3 answers 204 for missing keys as well
            self.client
                .delete_object()
                .bucket(&self.config.bucket)
                .key(key)
                .send()
                .await
                .map_err(|e| store_error(&e))?;
        }

        Ok(())
    }
}

/// Map an SDK failure to a `StoreError` carrying a short, caller-safe message.
/// The full error context only goes to the debug log.
fn store_error<E>(err: &SdkError<E, HttpResponse>) -> StoreError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    debug!("S3 request failed: {}", DisplayErrorContext(err));

    let Some(status) = err.raw_response().map(|r| r.status().as_u16()) else {
        let message = match err {
            SdkError::TimeoutError(_) => "S3 request timed out".to_string(),
            SdkError::DispatchFailure(_) => "S3 endpoint unreachable".to_string(),
            _ => "S3 request could not be sent".to_string(),
        };
        return StoreError::Transport(message);
    };

    let service = err.as_service_error();
    let message = service
        .and_then(|s| s.message())
        .or_else(|| service.and_then(|s| s.code()))
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("S3 request failed with status {}", status));

    StoreError::backend(status, message)
}
