use std::time::Duration;

use axum::{extract::State, Json};
use object_storage::BucketObject;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    state::AppState,
    types::{parse_expiration, AppError, PathParams, QueryParams},
};

/// Query parameters of the presigned URL endpoints
#[derive(Debug, Deserialize)]
pub struct ExpirationQuery {
    /// Go-style duration overriding the default expiration
    pub expiration: Option<String>,
}

/// Presigned URL response
#[derive(Debug, Serialize, Deserialize)]
pub struct UrlResponse {
    /// Presigned URL to use directly against the object store
    pub url: String,
}

fn resolve_expiration(state: &AppState, raw: Option<&str>) -> Result<Duration, AppError> {
    parse_expiration(raw, state.settings.default_expiration).map_err(|e| {
        tracing::warn!("Rejected expiration: {e}");
        AppError::bad_request(format!("Failed to parse Duration {}", raw.unwrap_or_default()))
    })
}

/// Creates a presigned URL for uploading an object
///
/// # Errors
///
/// - 400 if `expiration` is not a positive duration
/// - 404 if the bucket does not exist
/// - 500 for any other storage failure
#[instrument(skip(state))]
pub async fn create_upload_url(
    State(state): State<AppState>,
    PathParams((bucket, key)): PathParams<(String, String)>,
    QueryParams(query): QueryParams<ExpirationQuery>,
) -> Result<Json<UrlResponse>, AppError> {
    let expiration = resolve_expiration(&state, query.expiration.as_deref())?;
    let object = BucketObject::new(bucket, key);

    let url = state
        .storage
        .create_upload_url(&object, expiration)
        .await
        .map_err(|e| {
            AppError::from_operation(&format!("Failed to create PutObject URL for {object}"), &e)
        })?;

    tracing::debug!("{object} => {url}");

    Ok(Json(UrlResponse { url }))
}

/// Creates a presigned URL for downloading an object
///
/// # Errors
///
/// - 400 if `expiration` is not a positive duration
/// - 404 if the bucket or key does not exist
/// - 500 for any other storage failure
#[instrument(skip(state))]
pub async fn create_download_url(
    State(state): State<AppState>,
    PathParams((bucket, key)): PathParams<(String, String)>,
    QueryParams(query): QueryParams<ExpirationQuery>,
) -> Result<Json<UrlResponse>, AppError> {
    let expiration = resolve_expiration(&state, query.expiration.as_deref())?;
    let object = BucketObject::new(bucket, key);

    let url = state
        .storage
        .create_download_url(&object, expiration)
        .await
        .map_err(|e| {
            AppError::from_operation(&format!("Failed to create GetObject URL for {object}"), &e)
        })?;

    tracing::debug!("{object} => {url}");

    Ok(Json(UrlResponse { url }))
}
