use std::sync::Arc;

use anyhow::Context;

use scribe_api::store::{MemoryStore, PgStore, Store};
use scribe_api::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = scribe_api::config::config();
    tracing::info!("Starting Scribe API in {:?} mode", config.environment);

    let store: Arc<dyn Store> = match std::env::var("DATABASE_URL") {
        Ok(url) => Arc::new(
            PgStore::connect(&url)
                .await
                .context("failed to connect to database")?,
        ),
        Err(_) => {
            tracing::warn!("DATABASE_URL not set, using in-memory storage (data is lost on exit)");
            Arc::new(MemoryStore::new())
        }
    };

    let app = app(AppState { store });

    // Allow tests or deployments to override port via env
    let port = std::env::var("SCRIBE_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    println!("🚀 Scribe API server listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server")?;
    Ok(())
}
