// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Status API routes.

use crate::error::{AppError, Result};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/status/{user_id}", get(user_status))
}

/// Authentication status for one API key.
#[derive(Serialize)]
pub struct UserStatusResponse {
    pub authenticated: bool,
    pub email: String,
    pub created: String,
    pub last_used: String,
}

/// Check whether an API key resolves to an active user.
async fn user_status(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<UserStatusResponse>> {
    let user = state
        .db
        .get_user(&user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(UserStatusResponse {
        authenticated: true,
        email: user.email,
        created: user.created_at,
        last_used: user.last_used,
    }))
}
