use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use dotenv::dotenv;

use api::config::AppConfig;
use api::observability::Observability;
use api::store::MongoStore;
use api::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv().ok();

    Observability::init()?;

    let config = AppConfig::from_env().context("invalid configuration")?;

    let store = MongoStore::connect(&config.database.uri, &config.database.name)
        .await
        .context("failed to connect to MongoDB")?;
    tracing::info!(database = %config.database.name, "Database connected");

    if config.google.is_none() {
        tracing::warn!("GOOGLE_CLIENT_ID / GOOGLE_CLIENT_SECRET not set; Google login disabled");
    }

    let state = AppState::new(Arc::new(store), &config);
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("API server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
