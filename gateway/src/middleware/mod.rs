mod access_log;
mod auth;
mod recovery;

pub use access_log::{access_log_middleware, ACCESS_LOG_TARGET};
pub use auth::auth_middleware;
pub use recovery::recovery_middleware;
