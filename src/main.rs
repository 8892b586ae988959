//! burndown-gateway server entry point.
//!
//! Starts the Axum HTTP server with the webhook receiver and the
//! reporting endpoints.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use burndown_gateway::api;
use burndown_gateway::app_state::AppState;
use burndown_gateway::config::GatewayConfig;
use burndown_gateway::domain::Clock;
use burndown_gateway::persistence::Store;
use burndown_gateway::persistence::memory::MemoryStore;
use burndown_gateway::persistence::postgres::PostgresStore;
use burndown_gateway::service::{CountsService, WebhookService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = GatewayConfig::from_env().map_err(|e| anyhow::anyhow!(e.to_string()))?;
    tracing::info!(addr = %config.listen_addr, "starting burndown-gateway");

    // Build the store
    let store: Arc<dyn Store> = if config.persistence_enabled {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await?;
        tracing::info!("connected to PostgreSQL");
        Arc::new(PostgresStore::new(pool))
    } else {
        tracing::warn!("persistence disabled; state will not survive restarts");
        Arc::new(MemoryStore::new())
    };

    // Build service layer
    let clock = Clock::system();
    let webhook_service = Arc::new(WebhookService::new(Arc::clone(&store), clock.clone()));
    let counts_service = Arc::new(CountsService::new(store, clock));

    // Build application state
    let app_state = AppState {
        webhook_service,
        counts_service,
    };

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
