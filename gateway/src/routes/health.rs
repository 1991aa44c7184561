use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `ok`
    pub response: String,
    /// Current version of the application
    pub version: String,
}

/// Health check endpoint
///
/// Returns the current status and version information of the service.
/// This endpoint is never authenticated nor access-logged.
pub async fn handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        response: "ok".to_string(),
        version: state.settings.version.clone(),
    })
}
