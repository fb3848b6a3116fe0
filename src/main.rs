use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use repairdesk::config::AppConfig;
use repairdesk::db::SqliteDocumentStore;
use repairdesk::services::notification::Notifier;
use repairdesk::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let store = SqliteDocumentStore::open(&config.database_url)?;
    tracing::info!("document store opened at {}", config.database_url);

    let notifier = Notifier::from_config(&config);
    let notifier_enabled = notifier.is_enabled();
    let state = AppState::new(config.clone(), Arc::new(store), notifier);

    let app = repairdesk::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!(emails = notifier_enabled, "starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
