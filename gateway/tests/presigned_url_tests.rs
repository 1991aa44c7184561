mod common;

use axum::http::StatusCode;
use common::*;
use serde_json::json;

#[tokio::test]
async fn test_upload_url_uses_default_expiration() {
    let setup = TestSetup::new();

    let response = setup
        .send_post_request("/api/v1/presigned/url/dummybucket/folder/file.bin")
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_response_body(response).await;
    let url = body["url"].as_str().unwrap();
    assert!(url.contains("/dummybucket/folder/file.bin?"));
    assert_eq!(embedded_expiry(url), Some(900));
}

#[tokio::test]
async fn test_explicit_expiration_is_embedded() {
    let setup = TestSetup::new();
    setup.seed("/report.pdf").await;

    let response = setup
        .send_get_request("/api/v1/presigned/url/dummybucket/report.pdf?expiration=1h30m")
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_response_body(response).await;
    assert_eq!(embedded_expiry(body["url"].as_str().unwrap()), Some(5400));
}

#[tokio::test]
async fn test_empty_expiration_falls_back_to_default() {
    let setup = TestSetup::new();

    let response = setup
        .send_post_request("/api/v1/presigned/url/dummybucket/file?expiration=")
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_response_body(response).await;
    assert_eq!(embedded_expiry(body["url"].as_str().unwrap()), Some(900));
}

#[tokio::test]
async fn test_invalid_expiration_is_rejected() {
    let setup = TestSetup::new();

    for raw in ["abc", "10", "-5m", "0s"] {
        let response = setup
            .send_post_request(&format!(
                "/api/v1/presigned/url/dummybucket/file?expiration={raw}"
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "expiration={raw}");

        let body = parse_response_body(response).await;
        assert_eq!(body, json!({ "error": format!("Failed to parse Duration {raw}") }));
    }
}

#[tokio::test]
async fn test_upload_and_download_urls_differ() {
    let setup = TestSetup::new();
    setup.seed("/same").await;

    let upload = setup
        .send_post_request("/api/v1/presigned/url/dummybucket/same")
        .await
        .unwrap();
    let download = setup
        .send_get_request("/api/v1/presigned/url/dummybucket/same")
        .await
        .unwrap();
    assert_eq!(upload.status(), StatusCode::OK);
    assert_eq!(download.status(), StatusCode::OK);

    let upload = parse_response_body(upload).await;
    let download = parse_response_body(download).await;
    assert_ne!(upload["url"], download["url"]);
}

#[tokio::test]
async fn test_download_url_for_missing_key_is_not_found() {
    let setup = TestSetup::new();

    let response = setup
        .send_get_request("/api/v1/presigned/url/dummybucket/missing")
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = parse_response_body(response).await;
    let message = body["error"].as_str().unwrap();
    assert!(message.starts_with("Failed to create GetObject URL for dummybucket/missing"));
}

#[tokio::test]
async fn test_upload_url_for_missing_bucket_is_not_found() {
    let setup = TestSetup::new();

    let response = setup
        .send_post_request("/api/v1/presigned/url/nobucket/file")
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = parse_response_body(response).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .ends_with("bucket not found: nobucket"));
}

#[tokio::test]
async fn test_duplicate_expiration_is_json_error() {
    let setup = TestSetup::new();

    let response = setup
        .send_post_request("/api/v1/presigned/url/dummybucket/file?expiration=1h&expiration=2h")
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = parse_response_body(response).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Failed to deserialize query string"));
}
