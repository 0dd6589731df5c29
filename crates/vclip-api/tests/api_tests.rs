//! HTTP surface integration tests, exercised against the real router with
//! an in-memory Registry and an S3 client pointed at dummy credentials (no
//! network call happens unless a handler actually needs storage).

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use vclip_api::{create_router, ApiConfig, AppState};
use vclip_queue::{Registry, RegistryConfig};
use vclip_storage::{RemoteStorage, StorageConfig};

async fn test_state() -> AppState {
    let config = ApiConfig {
        api_key: "test-key".to_string(),
        ..ApiConfig::default()
    };
    let storage_config = StorageConfig {
        endpoint_url: "http://localhost:9999".to_string(),
        access_key_id: "test".to_string(),
        secret_access_key: "test".to_string(),
        bucket_name: "test-bucket".to_string(),
        region: "auto".to_string(),
    };
    let storage = RemoteStorage::new(storage_config)
        .await
        .expect("client construction does not touch the network");
    let (registry, _dispatch) = Registry::new(RegistryConfig::default());
    AppState::new(config, storage, registry)
}

#[tokio::test]
async fn version_endpoint_returns_ok() {
    let app = create_router(test_state().await, None);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/version")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn security_headers_are_present() {
    let app = create_router(test_state().await, None);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/version")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let headers = response.headers();
    assert!(headers.contains_key("X-Content-Type-Options"));
    assert!(headers.contains_key("X-Frame-Options"));
    assert!(headers.contains_key("X-Request-ID"));
}

#[tokio::test]
async fn jobs_endpoint_rejects_missing_api_key() {
    let app = create_router(test_state().await, None);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/jobs")
                .header("content-type", "application/json")
                .body(Body::from(
                    r#"{"source_type":"url","source_url":"https://example.com/v.mp4"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn get_job_returns_not_found_for_unknown_id() {
    let app = create_router(test_state().await, None);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/jobs/does-not-exist")
                .header("x-api-key", "test-key")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_job_accepts_well_formed_request() {
    let app = create_router(test_state().await, None);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/jobs")
                .header("content-type", "application/json")
                .header("x-api-key", "test-key")
                .body(Body::from(
                    r#"{"source_type":"url","source_url":"https://example.com/v.mp4"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
#[ignore = "requires a reachable S3-compatible endpoint"]
async fn healthz_reports_storage_connectivity() {
    let app = create_router(test_state().await, None);

    let response = app
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
