// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Json;
use gsc_gateway::config::Config;
use gsc_gateway::db::Database;
use gsc_gateway::mcp::SessionRegistry;
use gsc_gateway::models::GoogleCredential;
use gsc_gateway::routes::create_router;
use gsc_gateway::services::{CredentialService, GoogleAuthClient, OAuthFlow, SearchConsoleClient};
use gsc_gateway::AppState;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Create a test app over an in-memory database.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub async fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with(Config::default(), GoogleAuthClient::new()).await
}

/// Create a test app with a custom config and Google client. Tests that
/// drive the OAuth flow point the client at a local stand-in server.
#[allow(dead_code)]
pub async fn create_test_app_with(
    config: Config,
    google: GoogleAuthClient,
) -> (axum::Router, Arc<AppState>) {
    let db = Database::connect_in_memory()
        .await
        .expect("Failed to open in-memory database");

    let flow = OAuthFlow::new(&config, db.clone(), google.clone());
    let credentials = CredentialService::new(db.clone(), google);
    let gsc = SearchConsoleClient::new();

    let state = Arc::new(AppState {
        config,
        db,
        flow,
        credentials,
        gsc,
        sessions: SessionRegistry::new(),
    });

    (create_router(state.clone()), state)
}

/// A credential that never needs the network: no recorded expiry, and a
/// token endpoint on a dead port so any refresh attempt fails loudly.
#[allow(dead_code)]
pub fn live_credential(access_token: &str) -> GoogleCredential {
    GoogleCredential {
        access_token: access_token.to_string(),
        refresh_token: Some("refresh-token".to_string()),
        token_uri: "http://127.0.0.1:9/token".to_string(),
        client_id: "test_client_id".to_string(),
        client_secret: "test_client_secret".to_string(),
        scopes: vec!["https://www.googleapis.com/auth/webmasters".to_string()],
        expires_at: None,
    }
}

/// Store a user directly, bypassing the OAuth flow.
#[allow(dead_code)]
pub async fn seed_user(db: &Database, user_id: &str, email: &str, credential: &GoogleCredential) {
    db.save_user(user_id, email, credential)
        .await
        .expect("Failed to seed user");
}

async fn mock_token(State(hits): State<Arc<AtomicUsize>>) -> Json<serde_json::Value> {
    hits.fetch_add(1, Ordering::SeqCst);
    Json(json!({
        "access_token": "mock-access-token",
        "refresh_token": "mock-refresh-token",
        "expires_in": 3600,
    }))
}

async fn mock_userinfo() -> Json<serde_json::Value> {
    Json(json!({ "email": "tester@example.com" }))
}

async fn mock_token_failure() -> impl IntoResponse {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "invalid_grant" })),
    )
}

/// Spawn a local stand-in for Google's token and userinfo endpoints.
/// Returns the base URL and a count of token-endpoint hits.
#[allow(dead_code)]
pub async fn spawn_mock_google() -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let router = axum::Router::new()
        .route("/token", post(mock_token))
        .route("/userinfo", get(mock_userinfo))
        .with_state(hits.clone());

    (spawn_server(router).await, hits)
}

/// Spawn a stand-in whose token endpoint always rejects the grant.
#[allow(dead_code)]
pub async fn spawn_failing_google() -> String {
    let router = axum::Router::new()
        .route("/token", post(mock_token_failure))
        .route("/userinfo", get(mock_userinfo));

    spawn_server(router).await
}

async fn spawn_server(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock server");
    let addr = listener.local_addr().expect("mock server address");

    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("mock server");
    });

    format!("http://{}", addr)
}
