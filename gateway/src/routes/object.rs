use axum::{extract::State, Json};
use object_storage::BucketObject;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    state::AppState,
    types::{AppError, FormKeys, PathParams, QueryParams},
};

/// Response of operations that only report success
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Always `ok`
    pub response: String,
}

impl StatusResponse {
    fn ok() -> Json<Self> {
        Json(Self {
            response: "ok".to_string(),
        })
    }
}

/// Destination of a copy
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyQuery {
    /// Bucket to copy into
    pub dest_bucket: Option<String>,
    /// Key to copy to
    pub dest_key: Option<String>,
}

/// Deletes a single object
///
/// Succeeds whether or not the object existed.
///
/// # Errors
///
/// - 500 for any storage failure
#[instrument(skip(state))]
pub async fn delete_object(
    State(state): State<AppState>,
    PathParams((bucket, key)): PathParams<(String, String)>,
) -> Result<Json<StatusResponse>, AppError> {
    remove(&state, &BucketObject::new(bucket, key)).await
}

/// Deletes a single object in a bucket named after a static route segment
///
/// `DELETE /api/v1/object/delete/...` and `DELETE /api/v1/object/copy/...`
/// resolve to the batch delete and copy routes. There `bucket` is the
/// segment itself and every path parameter belongs to the key.
///
/// # Errors
///
/// - 500 for any storage failure
#[instrument(skip(state))]
pub async fn delete_object_in(
    state: &AppState,
    bucket: &'static str,
    segments: &[String],
) -> Result<Json<StatusResponse>, AppError> {
    remove(state, &BucketObject::new(bucket, segments.join("/"))).await
}

async fn remove(state: &AppState, object: &BucketObject) -> Result<Json<StatusResponse>, AppError> {
    state.storage.delete_object(object).await.map_err(|e| {
        tracing::error!("Failed to delete object {object}: {e}");
        AppError::internal(format!("Failed to delete object {}", object.key()))
    })?;

    Ok(StatusResponse::ok())
}

/// Deletes every `key` listed in the urlencoded form from one bucket
///
/// # Errors
///
/// - 400 if no key is given or the body is not urlencoded
/// - 500 if the batch failed, even partially
#[instrument(skip(state, keys))]
pub async fn batch_delete(
    State(state): State<AppState>,
    PathParams(bucket): PathParams<String>,
    FormKeys(keys): FormKeys,
) -> Result<Json<StatusResponse>, AppError> {
    if keys.is_empty() {
        return Err(AppError::bad_request(
            "Failed to parse body: at least one key is required",
        ));
    }

    let objects: Vec<BucketObject> = keys
        .into_iter()
        .map(|key| BucketObject::new(bucket.as_str(), key))
        .collect();

    state.storage.batch_delete(&objects).await.map_err(|e| {
        tracing::error!(
            "Failed to delete {} objects in bucket {bucket}: {e}",
            objects.len()
        );
        AppError::internal(format!("Failed to delete objects {bucket}"))
    })?;

    Ok(StatusResponse::ok())
}

/// Copies an object on the server side
///
/// # Errors
///
/// - 400 if `destBucket` or `destKey` is missing
/// - 404 if a bucket or the source key does not exist
/// - 500 for any other storage failure
#[instrument(skip(state))]
pub async fn copy_object(
    State(state): State<AppState>,
    PathParams((bucket, key)): PathParams<(String, String)>,
    QueryParams(query): QueryParams<CopyQuery>,
) -> Result<Json<StatusResponse>, AppError> {
    let destination_bucket = query
        .dest_bucket
        .filter(|bucket| !bucket.is_empty())
        .ok_or_else(|| AppError::bad_request("Missing destination bucket"))?;
    let destination_key = query
        .dest_key
        .filter(|key| !key.is_empty())
        .ok_or_else(|| AppError::bad_request("Missing destination key"))?;

    let source = BucketObject::new(bucket, key);
    let destination = BucketObject::new(destination_bucket, destination_key);

    state
        .storage
        .copy_object(&source, &destination)
        .await
        .map_err(|e| {
            AppError::from_operation(
                &format!("Failed to copy object {source} to {destination}"),
                &e,
            )
        })?;

    Ok(StatusResponse::ok())
}
