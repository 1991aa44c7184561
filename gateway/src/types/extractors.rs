//! Custom extractors that reject with the API error body

use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::{header::CONTENT_TYPE, request::Parts},
};
use serde::de::DeserializeOwned;
use url::form_urlencoded;

use crate::types::error::AppError;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Path parameters extractor answering `{"error": ...}` on failure
pub struct PathParams<T>(pub T);

impl<T, S> FromRequestParts<S> for PathParams<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

/// Query string extractor answering `{"error": ...}` on failure
pub struct QueryParams<T>(pub T);

impl<T, S> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

/// Values of a repeated form field, read from the urlencoded body then the
/// query string
///
/// A missing `Content-Type` is treated as urlencoded. Any other content type
/// is rejected before the body is read. Empty values are skipped.
pub struct FormKeys(pub Vec<String>);

impl FormKeys {
    /// Form field repeated once per key
    pub const FIELD: &'static str = "key";

    fn collect(body: &[u8], query: Option<&str>) -> Vec<String> {
        let query = query.unwrap_or_default().as_bytes();

        form_urlencoded::parse(body)
            .chain(form_urlencoded::parse(query))
            .filter(|(name, value)| name == Self::FIELD && !value.is_empty())
            .map(|(_, value)| value.into_owned())
            .collect()
    }
}

impl<S> FromRequest<S> for FormKeys
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(content_type) = req.headers().get(CONTENT_TYPE) {
            let mime = content_type
                .to_str()
                .unwrap_or_default()
                .split(';')
                .next()
                .unwrap_or_default()
                .trim();

            if !mime.eq_ignore_ascii_case(FORM_CONTENT_TYPE) {
                return Err(AppError::bad_request(format!(
                    "Failed to parse body: unsupported Content-Type {mime:?}, expected {FORM_CONTENT_TYPE}"
                )));
            }
        }

        let query = req.uri().query().map(ToOwned::to_owned);
        let body = Bytes::from_request(req, state).await?;

        Ok(Self(Self::collect(&body, query.as_deref())))
    }
}
