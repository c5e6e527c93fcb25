//! HTTP handlers for the upload gateway

use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, Path, State},
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use super::form::FormFiles;
use super::types::*;
use crate::error::GatewayError;
use crate::services::{MULTIPLE_UPLOAD_FIELD, SINGLE_UPLOAD_FIELDS};

/// OpenAPI documentation for the gateway API
#[derive(OpenApi)]
#[openapi(
    paths(health, upload_single, upload_multiple, delete_file),
    components(schemas(
        HealthResponse,
        UploadResponse,
        UploadedFileResponse,
        MultipleUploadResponse,
        DeleteResponse,
        ErrorResponse,
    )),
    tags(
        (name = "Health", description = "Liveness"),
        (name = "Upload", description = "Image upload and removal")
    )
)]
pub struct GatewayApiDoc;

/// Configure gateway routes
pub fn configure_routes() -> Router<Arc<GatewayAppState>> {
    Router::new()
        .route("/health", get(health))
        .route("/upload", post(upload_single))
        .route("/upload/multiple", post(upload_multiple))
        .route("/delete/{filename}", delete(delete_file))
        .route("/api-docs/openapi.json", get(openapi_json))
}

/// Full application: routes, body limit and request tracing
pub fn build_router(state: Arc<GatewayAppState>, max_upload_bytes: usize) -> Router {
    configure_routes()
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn multipart_or_error(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Multipart, GatewayError> {
    multipart.map_err(|rejection| {
        GatewayError::Validation(format!("Expected a multipart form: {}", rejection.body_text()))
    })
}

/// Liveness check
#[utoipa::path(
    tag = "Health",
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is running", body = HealthResponse)
    )
)]
async fn health(State(state): State<Arc<GatewayAppState>>) -> impl IntoResponse {
    Json(HealthResponse::from(state.upload_service.health()))
}

/// Upload a single image
#[utoipa::path(
    tag = "Upload",
    post,
    path = "/upload",
    request_body(
        content = String,
        content_type = "multipart/form-data",
        description = "Image file under the `game_image` field, or `image` as a fallback"
    ),
    responses(
        (status = 200, description = "Image uploaded", body = UploadResponse),
        (status = 400, description = "Missing file or unsupported type", body = ErrorResponse),
        (status = 413, description = "Body over the upload size limit", body = ErrorResponse),
        (status = 500, description = "Storage error", body = ErrorResponse)
    )
)]
async fn upload_single(
    State(state): State<Arc<GatewayAppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, GatewayError> {
    let mut form = FormFiles::from_multipart(multipart_or_error(multipart)?).await?;
    let file = form.take_first_of(SINGLE_UPLOAD_FIELDS);

    let uploaded = state.upload_service.upload_single(file).await?;

    Ok(Json(UploadResponse::from(uploaded)))
}

/// Upload several images at once
///
/// Files that fail validation or storage are left out of the response;
/// the request only fails when none could be stored.
#[utoipa::path(
    tag = "Upload",
    post,
    path = "/upload/multiple",
    request_body(
        content = String,
        content_type = "multipart/form-data",
        description = "One or more image files under the repeated `images` field"
    ),
    responses(
        (status = 200, description = "At least one image uploaded", body = MultipleUploadResponse),
        (status = 400, description = "No files sent", body = ErrorResponse),
        (status = 413, description = "Body over the upload size limit", body = ErrorResponse),
        (status = 500, description = "No file could be stored", body = ErrorResponse)
    )
)]
async fn upload_multiple(
    State(state): State<Arc<GatewayAppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, GatewayError> {
    let mut form = FormFiles::from_multipart(multipart_or_error(multipart)?).await?;
    let files = form.take_all(MULTIPLE_UPLOAD_FIELD);

    let uploaded = state.upload_service.upload_multiple(files).await?;

    Ok(Json(MultipleUploadResponse::from(uploaded)))
}

/// Delete a stored image by its exact name
#[utoipa::path(
    tag = "Upload",
    delete,
    path = "/delete/{filename}",
    params(
        ("filename" = String, Path, description = "Storage name returned by an upload"),
    ),
    responses(
        (status = 200, description = "Delete request accepted by storage", body = DeleteResponse),
        (status = 500, description = "Storage error", body = ErrorResponse)
    )
)]
async fn delete_file(
    State(state): State<Arc<GatewayAppState>>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    state.upload_service.delete_file(&filename).await?;

    Ok(Json(DeleteResponse::default()))
}

async fn openapi_json() -> impl IntoResponse {
    Json(GatewayApiDoc::openapi())
}
