//! Upload Gateway service: validate, rename, store, relay

use std::sync::Arc;

use bytes::Bytes;
use pixgate_storage::{BlobStore, PutOptions, DEFAULT_CONTENT_TYPE};
use tracing::{debug, info, warn};

use super::naming::{is_allowed_filename, NameGenerator};
use crate::error::GatewayError;

/// Form field names accepted by the single upload, in priority order
pub const SINGLE_UPLOAD_FIELDS: &[&str] = &["game_image", "image"];

/// Form field name used by the batch upload
pub const MULTIPLE_UPLOAD_FIELD: &str = "images";

pub const HEALTH_MESSAGE: &str = "Upload service is running";

const UNSUPPORTED_TYPE_MESSAGE: &str =
    "Unsupported file type. Only PNG, JPG, JPEG, GIF and WebP images are allowed";

/// A file part received from a client
#[derive(Debug, Clone)]
pub struct IncomingFile {
    /// Filename as sent by the client, possibly empty
    pub filename: String,
    /// Declared content type, if any
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl IncomingFile {
    pub fn new(filename: impl Into<String>, content_type: Option<String>, data: Bytes) -> Self {
        Self {
            filename: filename.into(),
            content_type,
            data,
        }
    }
}

/// A file accepted by the blob store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub url: String,
    /// Generated storage name
    pub filename: String,
    /// Storage path; identical to `filename` since objects live at the bucket root
    pub path: String,
}

/// Liveness payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthStatus {
    pub status: &'static str,
    pub message: &'static str,
}

/// The gateway itself. Holds no per-request state and is shared behind an `Arc`.
pub struct UploadService {
    store: Arc<dyn BlobStore>,
    names: NameGenerator,
}

impl UploadService {
    /// Gateway with wall-clock timestamps and random suffixes
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self::with_name_generator(store, NameGenerator::default())
    }

    pub fn with_name_generator(store: Arc<dyn BlobStore>, names: NameGenerator) -> Self {
        Self { store, names }
    }

    pub fn store(&self) -> &Arc<dyn BlobStore> {
        &self.store
    }

    pub fn health(&self) -> HealthStatus {
        HealthStatus {
            status: "ok",
            message: HEALTH_MESSAGE,
        }
    }

    /// Upload one file. `None` means the request carried no file field.
    pub async fn upload_single(
        &self,
        file: Option<IncomingFile>,
    ) -> Result<UploadedFile, GatewayError> {
        let file = file.ok_or_else(|| GatewayError::Validation("No file was sent".to_string()))?;

        if file.filename.is_empty() {
            return Err(GatewayError::Validation("No file was selected".to_string()));
        }

        let uploaded = self.store_file(file).await?;
        info!("Uploaded {} to {}", uploaded.path, self.store.backend_name());
        Ok(uploaded)
    }

    /// Upload a batch in order. Files that fail validation or storage are
    /// skipped; the call fails only when nothing was stored.
    pub async fn upload_multiple(
        &self,
        files: Vec<IncomingFile>,
    ) -> Result<Vec<UploadedFile>, GatewayError> {
        match files.first() {
            None => return Err(GatewayError::Validation("No files were sent".to_string())),
            Some(first) if first.filename.is_empty() => {
                return Err(GatewayError::Validation(
                    "No files were selected".to_string(),
                ))
            }
            Some(_) => {}
        }

        let total = files.len();
        let mut uploaded = Vec::with_capacity(total);

        for file in files {
            let original = file.filename.clone();
            match self.store_file(file).await {
                Ok(stored) => uploaded.push(stored),
                Err(e) => warn!("Skipping '{}' in batch upload: {}", original, e),
            }
        }

        if uploaded.is_empty() {
            return Err(GatewayError::Storage(
                "Failed to upload all files".to_string(),
            ));
        }

        info!(
            "Batch upload stored {} of {} files to {}",
            uploaded.len(),
            total,
            self.store.backend_name()
        );
        Ok(uploaded)
    }

    /// Remove an object by its exact storage name
    pub async fn delete_file(&self, name: &str) -> Result<(), GatewayError> {
        debug!("Deleting {}", name);

        self.store
            .delete(&[name.to_string()])
            .await
            .map_err(|e| GatewayError::Storage(format!("Failed to delete file: {}", e)))?;

        info!("Deleted {} from {}", name, self.store.backend_name());
        Ok(())
    }

    async fn store_file(&self, file: IncomingFile) -> Result<UploadedFile, GatewayError> {
        if !is_allowed_filename(&file.filename) {
            return Err(GatewayError::Validation(UNSUPPORTED_TYPE_MESSAGE.to_string()));
        }

        let unique_name = self
            .names
            .unique_name(&file.filename)
            .ok_or_else(|| GatewayError::Validation(UNSUPPORTED_TYPE_MESSAGE.to_string()))?;

        let content_type = file
            .content_type
            .filter(|ct| !ct.is_empty())
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

        debug!(
            "Storing '{}' as {} ({} bytes, {})",
            file.filename,
            unique_name,
            file.data.len(),
            content_type
        );

        self.store
            .put(&unique_name, file.data, PutOptions::create_only(content_type))
            .await
            .map_err(|e| GatewayError::Storage(format!("Failed to upload file: {}", e)))?;

        Ok(UploadedFile {
            url: self.store.public_url(&unique_name),
            filename: unique_name.clone(),
            path: unique_name,
        })
    }
}
