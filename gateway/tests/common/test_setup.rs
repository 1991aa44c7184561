use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header::AUTHORIZATION, Method, Request},
    response::Response,
    Router,
};
use object_storage::{memory::InMemoryObjectStorage, BucketObject};
use presign_gateway::{
    server,
    state::{AppState, GatewaySettings},
};
use tower::ServiceExt;

pub const TEST_BUCKET: &str = "dummybucket";
pub const TEST_VERSION: &str = "9.9.9";
pub const FAULT_KEY: &str = "/error";

/// Setup tracing for tests
pub fn setup_test_env() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init()
        .ok();
}

/// Full gateway over an in-memory object store
pub struct TestSetup {
    pub router: Router,
    pub storage: Arc<InMemoryObjectStorage>,
}

impl TestSetup {
    /// Open gateway, no API key configured
    pub fn new() -> Self {
        Self::with_api_key("")
    }

    pub fn with_api_key(api_key: &str) -> Self {
        setup_test_env();

        let storage = Arc::new(
            InMemoryObjectStorage::new()
                .with_bucket(TEST_BUCKET)
                .with_fault_key(FAULT_KEY),
        );
        let settings =
            GatewaySettings::new(TEST_VERSION, Duration::from_secs(15 * 60), api_key);
        let router = server::router(AppState::new(storage.clone(), settings));

        Self { router, storage }
    }

    /// Stores `key` in the test bucket
    pub async fn seed(&self, key: &str) -> BucketObject {
        let object = BucketObject::new(TEST_BUCKET, key);
        self.storage.put_object(&object).await.unwrap();
        object
    }

    pub async fn send_request(
        &self,
        method: Method,
        route: &str,
        token: Option<&str>,
        body: Option<String>,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let mut builder = Request::builder().uri(route).method(method);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, token);
        }
        let request = match body {
            Some(body) => builder
                .header("Content-Type", "application/x-www-form-urlencoded")
                .body(Body::from(body))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }

    pub async fn send_get_request(
        &self,
        route: &str,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        self.send_request(Method::GET, route, None, None).await
    }

    pub async fn send_post_request(
        &self,
        route: &str,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        self.send_request(Method::POST, route, None, None).await
    }

    pub async fn send_delete_request(
        &self,
        route: &str,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        self.send_request(Method::DELETE, route, None, None).await
    }
}
