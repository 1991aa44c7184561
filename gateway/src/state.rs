//! Application state management

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use object_storage::ObjectStorage;

use crate::types::DEFAULT_PRESIGNED_URL_EXPIRATION;

/// Path of the health check, always public and never access-logged
pub const HEALTH_CHECK_PATH: &str = "/";

/// Process-wide settings, read-only once the server starts
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    /// Version reported by the health check
    pub version: String,
    /// Expiration used when a request does not specify one
    pub default_expiration: Duration,
    /// Shared secret expected in the `Authorization` header; empty disables checks
    pub api_key: String,
    /// Paths that skip authorization and access logging
    pub public_paths: HashSet<String>,
}

impl GatewaySettings {
    /// Creates settings with the health check as the only public path
    #[must_use]
    pub fn new(version: impl Into<String>, default_expiration: Duration, api_key: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            default_expiration,
            api_key: api_key.into(),
            public_paths: HashSet::from([HEALTH_CHECK_PATH.to_string()]),
        }
    }

    /// Adds a path exempt from authorization and access logging
    #[must_use]
    pub fn with_public_path(mut self, path: impl Into<String>) -> Self {
        self.public_paths.insert(path.into());
        self
    }

    /// Whether `path` skips authorization and access logging
    #[must_use]
    pub fn is_public(&self, path: &str) -> bool {
        self.public_paths.contains(path)
    }
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self::new(
            env!("CARGO_PKG_VERSION"),
            DEFAULT_PRESIGNED_URL_EXPIRATION,
            String::new(),
        )
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Backend performing the storage operations
    pub storage: Arc<dyn ObjectStorage>,
    /// Process-wide settings
    pub settings: Arc<GatewaySettings>,
}

impl AppState {
    /// Creates the state from a storage backend and settings
    #[must_use]
    pub fn new(storage: Arc<dyn ObjectStorage>, settings: GatewaySettings) -> Self {
        Self {
            storage,
            settings: Arc::new(settings),
        }
    }
}
