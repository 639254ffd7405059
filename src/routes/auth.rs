// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google OAuth authentication routes.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::routes::pages;
use crate::services::oauth::CallbackInput;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/oauth/login", get(oauth_login))
        .route("/oauth/callback", get(oauth_callback))
        .route("/oauth/revoke/{user_id}", get(oauth_revoke))
}

/// Start the login flow - redirect to Google authorization.
async fn oauth_login(State(state): State<Arc<AppState>>) -> Response {
    match state.flow.begin_login().await {
        Ok(authorization_url) => Redirect::temporary(&authorization_url).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Could not start login flow");
            let (title, message) = match &e {
                AppError::Config(_) => (
                    "Configuration Error",
                    "Please set GOOGLE_CLIENT_ID and GOOGLE_CLIENT_SECRET environment variables."
                        .to_string(),
                ),
                _ => ("Login Failed", e.to_string()),
            };
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(pages::error_page(title, &message)),
            )
                .into_response()
        }
    }
}

/// Query parameters Google sends to the callback.
#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Handle the OAuth callback from Google.
async fn oauth_callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
) -> (StatusCode, Html<String>) {
    let input = CallbackInput {
        code: params.code,
        state: params.state,
        error: params.error,
    };

    match state.flow.complete_login(input).await {
        Ok(outcome) => (
            StatusCode::OK,
            Html(pages::success_page(
                &outcome.email,
                &outcome.user_id,
                &state.config.base_url,
            )),
        ),
        Err(AppError::InvalidState) => (
            StatusCode::BAD_REQUEST,
            Html(pages::error_page("Invalid State", "Please try again.")),
        ),
        Err(AppError::BadRequest(message)) => (
            StatusCode::BAD_REQUEST,
            Html(pages::error_page("Authentication Error", &message)),
        ),
        Err(e) => {
            tracing::error!(error = %e, "OAuth callback failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(pages::error_page("Authentication Failed", &e.to_string())),
            )
        }
    }
}

#[derive(Serialize)]
pub struct RevokeResponse {
    pub status: String,
    pub message: String,
}

/// Revoke a user's stored access.
async fn oauth_revoke(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<RevokeResponse>> {
    if !state.flow.revoke(&user_id).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    tracing::info!(user_id = %user_id, "Access revoked");
    Ok(Json(RevokeResponse {
        status: "revoked".to_string(),
        message: "Access has been revoked".to_string(),
    }))
}
