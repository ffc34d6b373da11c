use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use ecofleet_api::auth::AuthnService;
use ecofleet_api::config::AppConfig;
use ecofleet_api::handlers;
use ecofleet_api::service::Service;
use ecofleet_api::store::PgStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL and the rest.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env()?;

    let store = PgStore::connect(&config.database.url, config.database.max_connections)
        .await
        .context("failed to connect to the database")?;
    tracing::info!("connected to database");

    let signing_key = config.security.token_signing_key.as_bytes();
    let service = Arc::new(Service::new(AuthnService::new(signing_key), Arc::new(store)));
    let app = handlers::router(service, Arc::new(AuthnService::new(signing_key)));

    let addr = config.server.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "ecofleet API listening");

    axum::serve(listener, app).await.context("server")?;
    Ok(())
}
