use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;

use crate::{state::AppState, types::AppError};

/// Shared-secret authorization middleware
///
/// This middleware:
/// 1. Lets every request through when no API key is configured
/// 2. Lets requests to public paths through
/// 3. Compares the raw `Authorization` header with the API key
///
/// # Errors
///
/// - `AppError` - Missing (`token required`) or wrong (`invalid token`) token with 401 status code
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let settings = &state.settings;

    if settings.api_key.is_empty() || settings.is_public(request.uri().path()) {
        return Ok(next.run(request).await);
    }

    let token = request
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::unauthorized("token required"))?;

    if !tokens_match(token.as_bytes(), settings.api_key.as_bytes()) {
        return Err(AppError::unauthorized("invalid token"));
    }

    Ok(next.run(request).await)
}

fn tokens_match(supplied: &[u8], expected: &[u8]) -> bool {
    supplied.ct_eq(expected).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_match() {
        assert!(tokens_match(b"ABCD-123", b"ABCD-123"));
        assert!(!tokens_match(b"ABCD-124", b"ABCD-123"));
        assert!(!tokens_match(b"ABCD", b"ABCD-123"));
        assert!(!tokens_match(b"", b"ABCD-123"));
    }
}
