// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! GSC Gateway API Server
//!
//! Remote MCP server for Google Search Console. Users authenticate with
//! Google in a browser, receive an opaque API key, and point their MCP
//! client at the keyed SSE endpoint.

use gsc_gateway::{
    config::Config,
    db::Database,
    mcp::SessionRegistry,
    services::{CredentialService, GoogleAuthClient, OAuthFlow, SearchConsoleClient},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting GSC Gateway");

    if config.oauth_client().is_none() {
        tracing::warn!(
            "GOOGLE_CLIENT_ID / GOOGLE_CLIENT_SECRET not set; login stays disabled until they are"
        );
    }

    // Open the credential store
    let db = Database::connect(&config.database_url)
        .await
        .expect("Failed to open credential store");
    tracing::info!(database = %config.database_url, "Credential store ready");

    let google = GoogleAuthClient::new();
    let flow = OAuthFlow::new(&config, db.clone(), google.clone());
    let credentials = CredentialService::new(db.clone(), google);
    let gsc = SearchConsoleClient::new();

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        flow,
        credentials,
        gsc,
        sessions: SessionRegistry::new(),
    });

    // Build router
    let app = gsc_gateway::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gsc_gateway=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
