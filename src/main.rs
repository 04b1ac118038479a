mod capi_client;
mod config;
mod errors;
mod handlers;
mod hashing;
mod models;

use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::capi_client::CapiClient;
use crate::config::Config;

/// Main entry point for the relay.
///
/// Initializes tracing, loads configuration, wires the Conversions API
/// client into shared state, and starts the Axum server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "meta_lead_relay=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    // The client only exists when a token does; handlers report the missing
    // credential per request so health checks keep working meanwhile
    let capi_client = match &config.access_token {
        Some(token) => {
            let client = CapiClient::new(
                config.graph_base_url.clone(),
                config::PIXEL_ID.to_string(),
                token.clone(),
            )?;
            tracing::info!("CAPI client initialized: {}", config.graph_base_url);
            Some(client)
        }
        None => None,
    };

    let port = config.port;
    let app_state = Arc::new(handlers::AppState {
        config,
        capi_client,
    });

    let app = handlers::app(app_state)
        .layer(
            ServiceBuilder::new()
                // Request size limit: 64KB is generous for a lead form
                .layer(RequestBodyLimitLayer::new(64 * 1024)),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
