use axum::response::Response;
use http_body_util::BodyExt;

/// Parse response body to JSON
pub async fn parse_response_body(response: Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

/// Read the `X-Amz-Expires` value embedded in a presigned URL
pub fn embedded_expiry(url: &str) -> Option<u64> {
    url.split(['?', '&'])
        .find_map(|pair| pair.strip_prefix("X-Amz-Expires="))
        .and_then(|value| value.parse().ok())
}

/// Urlencoded batch delete body for `keys`
pub fn batch_delete_form(keys: &[&str]) -> String {
    keys.iter()
        .map(|key| format!("key={}", key.replace('/', "%2F")))
        .collect::<Vec<_>>()
        .join("&")
}
