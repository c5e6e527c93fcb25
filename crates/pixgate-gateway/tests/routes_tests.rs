use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use pixgate_gateway::services::{FixedClock, NameGenerator, SequenceSuffix};
use pixgate_gateway::{build_router, GatewayAppState, UploadService};
use pixgate_storage::MemoryStore;
use serde_json::Value;
use tower::ServiceExt;

const BOUNDARY: &str = "pixgate-test-boundary";
const MAX_UPLOAD_BYTES: usize = 1024 * 1024;

struct TestSetup {
    store: Arc<MemoryStore>,
    app: Router,
}

impl TestSetup {
    fn new() -> Self {
        Self::with_body_limit(MAX_UPLOAD_BYTES)
    }

    fn with_body_limit(max_upload_bytes: usize) -> Self {
        let store = Arc::new(MemoryStore::new("https://cdn.example.com/game_reviews"));
        let names = NameGenerator::new(
            Arc::new(FixedClock(1_700_000_000)),
            Arc::new(SequenceSuffix::new(vec![1000, 2000, 3000, 4000])),
        );
        let service = Arc::new(UploadService::with_name_generator(store.clone(), names));
        let app = build_router(Arc::new(GatewayAppState::new(service)), max_upload_bytes);
        Self { store, app }
    }
}

/// (field, filename, content type, body)
type Part<'a> = (&'a str, &'a str, Option<&'a str>, &'a str);

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for (field, filename, content_type, data) in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                field, filename
            )
            .as_bytes(),
        );
        if let Some(content_type) = content_type {
            body.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(data.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn multipart_request(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_health() {
    let setup = TestSetup::new();

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&setup.app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["message"], "Upload service is running");
}

#[tokio::test]
async fn test_upload_single_game_image() {
    let setup = TestSetup::new();

    let request = multipart_request(
        "/upload",
        &[("game_image", "Boss Fight.JPG", Some("image/jpeg"), "jpeg-bytes")],
    );
    let (status, body) = send(&setup.app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["filename"], "Boss_Fight-1700000000-1000.jpg");
    assert_eq!(body["path"], "Boss_Fight-1700000000-1000.jpg");
    assert_eq!(
        body["url"],
        "https://cdn.example.com/game_reviews/Boss_Fight-1700000000-1000.jpg"
    );

    let blob = setup
        .store
        .get("Boss_Fight-1700000000-1000.jpg")
        .await
        .unwrap();
    assert_eq!(blob.content_type, "image/jpeg");
    assert_eq!(&blob.body[..], b"jpeg-bytes");
}

#[tokio::test]
async fn test_upload_single_image_fallback_field() {
    let setup = TestSetup::new();

    let request = multipart_request("/upload", &[("image", "cover.webp", None, "webp")]);
    let (status, body) = send(&setup.app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["filename"], "cover-1700000000-1000.webp");
    // No declared type falls back to image/png
    let blob = setup.store.get("cover-1700000000-1000.webp").await.unwrap();
    assert_eq!(blob.content_type, "image/png");
}

#[tokio::test]
async fn test_upload_single_prefers_game_image() {
    let setup = TestSetup::new();

    let request = multipart_request(
        "/upload",
        &[
            ("image", "fallback.png", None, "1"),
            ("game_image", "primary.png", None, "2"),
        ],
    );
    let (status, body) = send(&setup.app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["filename"], "primary-1700000000-1000.png");
    assert_eq!(setup.store.len().await, 1);
}

#[tokio::test]
async fn test_upload_single_missing_file() {
    let setup = TestSetup::new();

    let request = multipart_request("/upload", &[("avatar", "x.png", None, "1")]);
    let (status, body) = send(&setup.app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "No file was sent");
}

#[tokio::test]
async fn test_upload_single_empty_filename() {
    let setup = TestSetup::new();

    let request = multipart_request("/upload", &[("game_image", "", None, "")]);
    let (status, body) = send(&setup.app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No file was selected");
}

#[tokio::test]
async fn test_upload_single_unsupported_type() {
    let setup = TestSetup::new();

    for filename in ["script.exe", "noextension"] {
        let request = multipart_request("/upload", &[("image", filename, None, "1")]);
        let (status, body) = send(&setup.app, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", filename);
        assert_eq!(body["success"], false);
    }
    assert!(setup.store.is_empty().await);
}

#[tokio::test]
async fn test_upload_single_storage_error() {
    let setup = TestSetup::new();
    setup.store.fail_with("Bucket not found").await;

    let request = multipart_request("/upload", &[("image", "a.png", None, "1")]);
    let (status, body) = send(&setup.app, request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Failed to upload file: Bucket not found");
}

#[tokio::test]
async fn test_upload_without_multipart_body() {
    let setup = TestSetup::new();

    let request = Request::builder()
        .method("POST")
        .uri("/upload")
        .header("content-type", "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let (status, body) = send(&setup.app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_upload_over_body_limit() {
    let setup = TestSetup::with_body_limit(1024);

    let data = "x".repeat(4096);
    let request = multipart_request("/upload", &[("image", "big.png", None, data.as_str())]);
    let (status, body) = send(&setup.app, request).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Request body exceeds the upload size limit");
    assert!(setup.store.is_empty().await);
}

#[tokio::test]
async fn test_upload_multiple_partial_success() {
    let setup = TestSetup::new();

    let request = multipart_request(
        "/upload/multiple",
        &[
            ("images", "a.png", Some("image/png"), "a"),
            ("images", "b.exe", None, "b"),
            ("images", "c.jpg", Some("image/jpeg"), "c"),
        ],
    );
    let (status, body) = send(&setup.app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 2);

    let files = body["files"].as_array().unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0]["filename"], "a-1700000000-1000.png");
    assert_eq!(files[1]["filename"], "c-1700000000-2000.jpg");
    assert_eq!(files[1]["path"], files[1]["filename"]);
}

#[tokio::test]
async fn test_upload_multiple_all_invalid() {
    let setup = TestSetup::new();

    let request = multipart_request(
        "/upload/multiple",
        &[("images", "a.exe", None, "a"), ("images", "b.bmp", None, "b")],
    );
    let (status, body) = send(&setup.app, request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Failed to upload all files");
}

#[tokio::test]
async fn test_upload_multiple_without_images_field() {
    let setup = TestSetup::new();

    let request = multipart_request("/upload/multiple", &[("image", "a.png", None, "a")]);
    let (status, body) = send(&setup.app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No files were sent");
}

#[tokio::test]
async fn test_delete_file() {
    let setup = TestSetup::new();

    let upload = multipart_request("/upload", &[("image", "a.png", None, "a")]);
    let (_, body) = send(&setup.app, upload).await;
    let path = body["path"].as_str().unwrap().to_string();

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/delete/{}", path))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&setup.app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "File deleted successfully");
    assert!(setup.store.is_empty().await);
}

#[tokio::test]
async fn test_delete_missing_file_succeeds() {
    let setup = TestSetup::new();

    let request = Request::builder()
        .method("DELETE")
        .uri("/delete/x.png")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&setup.app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_delete_store_error() {
    let setup = TestSetup::new();
    setup.store.fail_with("permission denied").await;

    let request = Request::builder()
        .method("DELETE")
        .uri("/delete/x.png")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&setup.app, request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Failed to delete file: permission denied");
}

#[tokio::test]
async fn test_openapi_document() {
    let setup = TestSetup::new();

    let request = Request::builder()
        .uri("/api-docs/openapi.json")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&setup.app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/upload"].is_object());
    assert!(body["paths"]["/upload/multiple"].is_object());
    assert!(body["paths"]["/delete/{filename}"].is_object());
}
