use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, Method},
    middleware::Next,
    response::Response,
};

use crate::{state::AppState, types::ErrorAnnotation};

/// Log target of access lines
pub const ACCESS_LOG_TARGET: &str = "access_log";

/// Writes one access log line per request, skipping public paths
///
/// The line carries status, latency, caller address, method, path and the
/// error message of failed requests.
pub async fn access_log_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if state.settings.is_public(request.uri().path()) {
        return next.run(request).await;
    }

    let entry = AccessEntry::start(&request);
    let response = next.run(request).await;
    entry.finish(&response);

    response
}

/// Request facts captured before dispatch, written once the response is known
pub struct AccessEntry {
    start: Instant,
    client: String,
    method: Method,
    path: String,
}

impl AccessEntry {
    /// Captures the request before it is dispatched
    pub fn start(request: &Request) -> Self {
        let peer = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        Self {
            start: Instant::now(),
            client: client_address(request.headers(), peer),
            method: request.method().clone(),
            path: request.uri().path().to_owned(),
        }
    }

    /// Writes the access line for `response`
    pub fn finish(self, response: &Response) {
        let Self {
            start,
            client,
            method,
            path,
        } = self;

        let latency = start.elapsed();
        let status = response.status().as_u16();
        let error = response
            .extensions()
            .get::<ErrorAnnotation>()
            .map_or("", |ErrorAnnotation(message)| message.as_str());

        tracing::info!(
            target: ACCESS_LOG_TARGET,
            status,
            latency_ms = latency.as_secs_f64() * 1000.0,
            client = %client,
            method = %method,
            path = %path,
            error,
            "{status:>3} | {latency:>12?} | {client:>15} | {method} {path}"
        );
    }
}

/// Caller address, preferring proxy headers over the TCP peer
fn client_address(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());

    let real_ip = headers
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty());

    forwarded
        .or(real_ip)
        .map(ToOwned::to_owned)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "-".to_string())
}
