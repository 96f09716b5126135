//! Tests for `AppError` → HTTP response mapping.
//!
//! These call `IntoResponse` directly; no router is involved.

use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use piniplm_api::error::AppError;
use piniplm_core::error::CoreError;
use piniplm_core::types::PartId;
use piniplm_store::StoreError;

/// Helper: convert an `AppError` into its status code and parsed JSON body.
async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn not_found_names_entity_and_id() {
    let id = PartId::new();
    let err = AppError::Core(CoreError::not_found("Part", id));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], format!("Part with id {id} not found"));
}

#[tokio::test]
async fn validation_error_returns_400() {
    let err = AppError::Core(CoreError::Validation("bad extension".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "bad extension");
}

#[tokio::test]
async fn bad_request_error_returns_400() {
    let err = AppError::BadRequest("invalid field value".into());

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["error"], "invalid field value");
}

#[tokio::test]
async fn cycle_detected_returns_409() {
    let p = PartId::new();
    let err = AppError::Core(CoreError::CycleDetected { parent: p, child: p });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "CYCLE_DETECTED");
    assert!(json["error"].as_str().unwrap().contains(&p.to_string()));
}

#[tokio::test]
async fn depth_exceeded_returns_409_with_its_own_code() {
    let err = AppError::Core(CoreError::DepthExceeded { limit: 64 });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "DEPTH_EXCEEDED");
    assert!(json["error"].as_str().unwrap().contains("64"));
}

#[tokio::test]
async fn store_domain_errors_keep_their_class() {
    let err: AppError = StoreError::Domain(CoreError::not_found("Instance", "abc")).into();

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Instance with id abc not found");
}

#[tokio::test]
async fn persistence_failure_is_sanitized_500() {
    let err: AppError = StoreError::Persistence {
        path: PathBuf::from("/secret/data.json"),
        source: std::io::Error::other("disk full"),
    }
    .into();

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}

#[tokio::test]
async fn internal_error_is_sanitized_500() {
    let err = AppError::InternalError("secret database details".into());

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "An internal error occurred");
}
