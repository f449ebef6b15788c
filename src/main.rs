//! Main entry point for the CDR patient service.
//!
//! Resolves configuration from the environment, wires the store and the
//! external service clients, and serves the REST API.
//!
//! # Environment Variables
//! - `CDR_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
//! - `DEMOGRAPHIC_BASE_URL`: base URL of the demographic service
//! - `METADATA_BASE_URL`: base URL of the metadata service
//! - `EXTERNAL_CALL_TIMEOUT_MS`: deadline per external call (default: 3000)

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
                .add_directive("cdr_run=info".parse()?)
                .add_directive("api_rest=info".parse()?)
                .add_directive("cdr_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("CDR_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let demographic_url = std::env::var("DEMOGRAPHIC_BASE_URL")
        .unwrap_or_else(|_| "http://demographic:8080".into());
    let metadata_url =
        std::env::var("METADATA_BASE_URL").unwrap_or_else(|_| "http://metadata:8080".into());
    let timeout = external_timeout_from_env_value(std::env::var("EXTERNAL_CALL_TIMEOUT_MS").ok())?;

    let cfg = CoreConfig::new(demographic_url, metadata_url, timeout)?;

    tracing::info!("-- Starting CDR patient service REST on {}", rest_addr);

    let state = AppState::new(
        Arc::new(MemoryStore::new()),
        Arc::new(HttpDemographicClient::new(&cfg)?),
        Arc::new(HttpMetadataClient::new(&cfg)?),
    );

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}
