use std::any::Any;
use std::fmt::Write as _;
use std::panic::AssertUnwindSafe;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use futures::FutureExt;

use super::access_log::AccessEntry;
use crate::{state::AppState, types::AppError};

/// Turns a panic anywhere below this layer into a 500 response
///
/// The request line and headers (never the body) are captured up front and
/// logged together with the panic payload. The unwind skips the access
/// logger, so the 500 gets its access line here.
pub async fn recovery_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let dump = dump_request(&request);
    let entry = (!state.settings.is_public(request.uri().path()))
        .then(|| AccessEntry::start(&request));

    match AssertUnwindSafe(next.run(request)).catch_unwind().await {
        Ok(response) => response,
        Err(panic) => {
            tracing::error!(
                "[Recovery] panic recovered: {} {dump}",
                panic_message(panic.as_ref())
            );
            let response = AppError::internal("Internal server error").into_response();
            if let Some(entry) = entry {
                entry.finish(&response);
            }
            response
        }
    }
}

/// Renders the request head; sensitive header values are redacted
fn dump_request(request: &Request) -> String {
    let mut dump = format!(
        "{} {} {:?}\n",
        request.method(),
        request.uri(),
        request.version()
    );

    for (name, value) in request.headers() {
        let value = if value.is_sensitive() {
            "<redacted>"
        } else {
            value.to_str().unwrap_or("<binary>")
        };
        let _ = writeln!(dump, "{name}: {value}");
    }

    dump
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
