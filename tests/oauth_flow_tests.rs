// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! End-to-end OAuth flow tests against a local stand-in for Google.
//!
//! These tests drive the login and callback routes through the router and
//! verify the callback branch order: a provider-reported error is handled
//! before the state is spent, a bad state never reaches the code exchange,
//! and a completed login leaves a working API key behind.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use gsc_gateway::config::Config;
use gsc_gateway::services::GoogleAuthClient;
use tower::ServiceExt;

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

fn query_param(url: &str, key: &str) -> Option<String> {
    let (_, query) = url.split_once('?')?;
    query.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        (k == key).then(|| v.to_string())
    })
}

async fn mock_google_app() -> (axum::Router, std::sync::Arc<gsc_gateway::AppState>) {
    let (base, _) = common::spawn_mock_google().await;
    let google = GoogleAuthClient::with_endpoints(
        format!("{base}/auth"),
        format!("{base}/token"),
        format!("{base}/userinfo"),
    );
    common::create_test_app_with(Config::default(), google).await
}

#[tokio::test]
async fn test_login_redirects_to_authorization_url() {
    let (app, _) = mock_google_app().await;

    let response = app.oneshot(get("/oauth/login")).await.unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    let location = response.headers()["location"].to_str().unwrap();
    assert!(location.contains("client_id=test_client_id"));
    assert!(query_param(location, "state").is_some());
}

#[tokio::test]
async fn test_login_without_client_config_is_500_page() {
    let config = Config {
        google_client_id: None,
        google_client_secret: None,
        ..Config::default()
    };
    let (app, _) = common::create_test_app_with(config, GoogleAuthClient::new()).await;

    let response = app.oneshot(get("/oauth/login")).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_string(response).await;
    assert!(body.contains("Configuration Error"));
    assert!(body.contains("GOOGLE_CLIENT_ID"));
}

#[tokio::test]
async fn test_full_login_flow_stores_user() {
    let (app, _state) = mock_google_app().await;

    let response = app.clone().oneshot(get("/oauth/login")).await.unwrap();
    let location = response.headers()["location"].to_str().unwrap().to_string();
    let csrf = query_param(&location, "state").expect("state in redirect");

    let callback = format!("/oauth/callback?code=test-code&state={csrf}");
    let response = app.clone().oneshot(get(&callback)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("Authentication Successful"));
    assert!(body.contains("tester@example.com"));
    assert!(body.contains("/sse"));

    // The page embeds the per-user endpoint; lift the key out of it
    let user_id = body
        .split("/mcp/")
        .nth(1)
        .and_then(|rest| rest.split('/').next())
        .expect("endpoint in page")
        .to_string();

    let response = app
        .clone()
        .oneshot(get(&format!("/api/status/{user_id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let status = body_string(response).await;
    let status: serde_json::Value = serde_json::from_str(&status).unwrap();
    assert_eq!(status["authenticated"], true);
    assert_eq!(status["email"], "tester@example.com");

    // The state was burned by the first callback
    let response = app.oneshot(get(&callback)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_provider_error_reported_before_state_is_spent() {
    let (app, state) = common::create_test_app().await;
    let csrf = state.db.issue_state().await.unwrap();

    let response = app
        .oneshot(get(&format!(
            "/oauth/callback?error=access_denied&state={csrf}&code=x"
        )))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_string(response).await;
    assert!(body.contains("Authentication Error"));
    assert!(body.contains("access_denied"));

    // The error branch ran first, so the state is still redeemable
    assert!(state.db.consume_state(&csrf).await.unwrap());
}

#[tokio::test]
async fn test_callback_without_state_is_rejected() {
    let (app, _) = common::create_test_app().await;

    let response = app
        .oneshot(get("/oauth/callback?code=test-code"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_string(response).await.contains("Invalid State"));
}

#[tokio::test]
async fn test_callback_with_unknown_state_is_rejected() {
    let (app, _) = common::create_test_app().await;

    let response = app
        .oneshot(get("/oauth/callback?code=test-code&state=never-issued"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_string(response).await.contains("Invalid State"));
}

#[tokio::test]
async fn test_callback_without_code_spends_the_state() {
    let (app, state) = common::create_test_app().await;
    let csrf = state.db.issue_state().await.unwrap();

    let response = app
        .oneshot(get(&format!("/oauth/callback?state={csrf}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_string(response).await;
    assert!(body.contains("Authentication Error"));
    assert!(body.contains("Missing authorization code"));

    // Even a failed attempt consumes the state
    assert!(!state.db.consume_state(&csrf).await.unwrap());
}

#[tokio::test]
async fn test_rejected_code_exchange_is_500_page() {
    let base = common::spawn_failing_google().await;
    let google = GoogleAuthClient::with_endpoints(
        format!("{base}/auth"),
        format!("{base}/token"),
        format!("{base}/userinfo"),
    );
    let (app, state) = common::create_test_app_with(Config::default(), google).await;
    let csrf = state.db.issue_state().await.unwrap();

    let response = app
        .oneshot(get(&format!("/oauth/callback?code=bad-code&state={csrf}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_string(response).await.contains("Authentication Failed"));

    // Nothing was persisted for the failed attempt
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(state.db.pool())
        .await
        .unwrap();
    assert_eq!(count, 0);
}
