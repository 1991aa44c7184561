use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use object_storage::s3::S3ObjectStorage;
use presign_gateway::{
    server,
    state::{AppState, GatewaySettings},
    types::{masked, Environment},
};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let environment = Environment::from_env()?;

    let env_filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Use JSON format for staging/production, regular format for development
    if environment.json_logs() {
        fmt().json().with_env_filter(env_filter()).init();
    } else {
        fmt().with_env_filter(env_filter()).init();
    }

    let s3_client = Arc::new(S3Client::from_conf(environment.s3_client_config().await));
    let storage = Arc::new(S3ObjectStorage::new(s3_client));

    let settings = GatewaySettings::new(
        env!("CARGO_PKG_VERSION"),
        environment.presigned_url_expiration()?,
        environment.api_key(),
    );

    tracing::info!(
        "Presign Gateway version:{} environment:{:?} port:{} s3-endpoint:{} expiration:{:?} api-key:{}",
        settings.version,
        environment,
        environment.port()?,
        environment
            .override_s3_endpoint_url()
            .unwrap_or_else(|| "default".to_string()),
        settings.default_expiration,
        masked(&settings.api_key),
    );

    server::start(environment, AppState::new(storage, settings)).await
}
