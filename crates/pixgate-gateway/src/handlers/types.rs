//! Request and response types for gateway HTTP handlers

use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;

use crate::services::{HealthStatus, UploadService, UploadedFile};

/// Application state for gateway handlers
pub struct GatewayAppState {
    pub upload_service: Arc<UploadService>,
}

impl GatewayAppState {
    pub fn new(upload_service: Arc<UploadService>) -> Self {
        Self { upload_service }
    }
}

/// Liveness response
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
    #[schema(example = "Upload service is running")]
    pub message: String,
}

impl From<HealthStatus> for HealthResponse {
    fn from(health: HealthStatus) -> Self {
        Self {
            status: health.status.to_string(),
            message: health.message.to_string(),
        }
    }
}

/// Response after uploading a single image
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UploadResponse {
    #[schema(example = true)]
    pub success: bool,
    #[schema(example = "Image uploaded successfully")]
    pub message: String,
    /// Public URL of the stored image
    #[schema(
        example = "https://abc.supabase.co/storage/v1/object/public/game_reviews/cover-1700000000-4242.png"
    )]
    pub url: String,
    /// Generated storage name
    #[schema(example = "cover-1700000000-4242.png")]
    pub filename: String,
    /// Storage path, to be persisted by the caller
    #[schema(example = "cover-1700000000-4242.png")]
    pub path: String,
}

impl From<UploadedFile> for UploadResponse {
    fn from(file: UploadedFile) -> Self {
        Self {
            success: true,
            message: "Image uploaded successfully".to_string(),
            url: file.url,
            filename: file.filename,
            path: file.path,
        }
    }
}

/// One stored file in a batch response
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UploadedFileResponse {
    pub url: String,
    pub filename: String,
    pub path: String,
}

impl From<UploadedFile> for UploadedFileResponse {
    fn from(file: UploadedFile) -> Self {
        Self {
            url: file.url,
            filename: file.filename,
            path: file.path,
        }
    }
}

/// Response after a batch upload. Files that could not be stored are not listed.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MultipleUploadResponse {
    #[schema(example = true)]
    pub success: bool,
    #[schema(example = "Uploaded 2 images successfully")]
    pub message: String,
    /// Number of stored files
    #[schema(example = 2)]
    pub count: usize,
    pub files: Vec<UploadedFileResponse>,
}

impl From<Vec<UploadedFile>> for MultipleUploadResponse {
    fn from(files: Vec<UploadedFile>) -> Self {
        let count = files.len();
        Self {
            success: true,
            message: format!(
                "Uploaded {} image{} successfully",
                count,
                if count == 1 { "" } else { "s" }
            ),
            count,
            files: files.into_iter().map(UploadedFileResponse::from).collect(),
        }
    }
}

/// Response after deleting an object
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DeleteResponse {
    #[schema(example = true)]
    pub success: bool,
    #[schema(example = "File deleted successfully")]
    pub message: String,
}

impl Default for DeleteResponse {
    fn default() -> Self {
        Self {
            success: true,
            message: "File deleted successfully".to_string(),
        }
    }
}

/// Body of every failed request
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = false)]
    pub success: bool,
    #[schema(example = "No file was sent")]
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
