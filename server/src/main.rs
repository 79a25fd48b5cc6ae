//! # server
//!
//! Axum host for the FoodHub web app: Leptos SSR routes, the compiled
//! `/pkg` assets, and a health probe. All data lives in the hosted backend,
//! which the browser talks to directly, so this process holds no state.

mod config;
mod error;
mod routes;

use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;
use crate::error::ServerError;

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    // A missing .env is normal in production.
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from_env()?;
    let app = routes::app()?;
    let listener = tokio::net::TcpListener::bind(config.addr()).await?;

    tracing::info!(port = config.port, "foodhub listening");
    axum::serve(listener, app).await?;
    Ok(())
}
