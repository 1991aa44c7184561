/// Health check
pub mod health;
/// Delete, batch delete and copy
pub mod object;
/// Presigned upload and download URLs
pub mod presigned_url;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get, post, MethodRouter},
    Router,
};

use crate::{
    state::{AppState, HEALTH_CHECK_PATH},
    types::PathParams,
};

/// Creates the router with all handler routes
///
/// Paths only match exactly: a trailing slash is not redirected, and a known
/// path hit with an unsupported method answers 404 like an unknown path.
pub fn handler() -> Router<AppState> {
    Router::new()
        .route(
            HEALTH_CHECK_PATH,
            get(health::handler).fallback(not_found),
        )
        .route(
            "/api/v1/presigned/url/{bucket}/{*key}",
            post(presigned_url::create_upload_url)
                .get(presigned_url::create_download_url)
                .fallback(not_found),
        )
        .route(
            "/api/v1/object/{bucket}/{*key}",
            delete(object::delete_object).fallback(not_found),
        )
        .route(
            "/api/v1/object/delete/{bucket}",
            post(object::batch_delete)
                .merge(delete_in_bucket("delete"))
                .fallback(not_found),
        )
        .route(
            "/api/v1/object/copy/{bucket}/{*key}",
            post(object::copy_object)
                .merge(delete_in_bucket("copy"))
                .fallback(not_found),
        )
        .fallback(not_found)
}

/// Single-object delete for a bucket whose name is shadowed by a static segment
fn delete_in_bucket(bucket: &'static str) -> MethodRouter<AppState> {
    delete(
        move |State(state): State<AppState>, PathParams(segments): PathParams<Vec<String>>| async move {
            object::delete_object_in(&state, bucket, &segments).await
        },
    )
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}
