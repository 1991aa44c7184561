mod environment;
mod error;
mod expiration;
mod extractors;

pub use environment::{masked, ConfigError, Environment, DEFAULT_PRESIGNED_URL_EXPIRATION};
pub use error::{status_for, ApiErrorResponse, AppError, ErrorAnnotation};
pub use expiration::{parse_duration, parse_expiration, ExpirationError};
pub use extractors::{FormKeys, PathParams, QueryParams};
