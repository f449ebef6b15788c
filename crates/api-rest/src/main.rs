//! Standalone REST API server binary.
//!
//! Runs the REST server on its own; useful for development and debugging.
//! The workspace's main `cdr-run` binary is the deployment entry point.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{router, AppState};
use cdr_core::clients::{HttpDemographicClient, HttpMetadataClient};
use cdr_core::config::external_timeout_from_env_value;
use cdr_core::store::MemoryStore;
use cdr_core::CoreConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("cdr_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("CDR_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let demographic_url = std::env::var("DEMOGRAPHIC_BASE_URL")
        .unwrap_or_else(|_| "http://demographic:8080".into());
    let metadata_url =
        std::env::var("METADATA_BASE_URL").unwrap_or_else(|_| "http://metadata:8080".into());
    let timeout = external_timeout_from_env_value(std::env::var("EXTERNAL_CALL_TIMEOUT_MS").ok())?;

    let cfg = CoreConfig::new(demographic_url, metadata_url, timeout)?;

    tracing::info!("-- Starting CDR patient REST API on {}", addr);

    let state = AppState::new(
        Arc::new(MemoryStore::new()),
        Arc::new(HttpDemographicClient::new(&cfg)?),
        Arc::new(HttpMetadataClient::new(&cfg)?),
    );

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}
