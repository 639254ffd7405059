// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! MCP transport routes.
//!
//! The SSE endpoint authenticates the path-embedded API key, opens a
//! session bound to that identity, and streams responses. The companion
//! messages endpoint feeds requests into the session's inbox. Dropping
//! the SSE stream tears the session down, so a later connection can never
//! inherit this one's identity.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use futures_util::stream::{self, Stream, StreamExt};
use serde::Deserialize;
use serde_json::Value;
use std::convert::Infallible;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::mcp::session::OpenSession;
use crate::mcp::McpServer;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/mcp/{user_id}/sse", get(sse_handler))
        .route("/mcp/{user_id}/messages", post(messages_handler))
}

/// Open an SSE stream for one authenticated user.
///
/// The first event names the endpoint the client must POST requests to;
/// every later event carries one JSON-RPC response.
async fn sse_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>> {
    if state.db.get_user(&user_id).await?.is_none() {
        return Err(AppError::Unauthorized);
    }

    let server = McpServer::new(user_id.clone(), state.credentials.clone(), state.gsc.clone());
    let OpenSession {
        session_id,
        events,
        guard,
    } = state.sessions.open(server);

    tracing::info!(user_id = %user_id, session_id = %session_id, "MCP session opened");

    let endpoint = format!("/mcp/{}/messages?session_id={}", user_id, session_id);
    let hello = stream::once(async move {
        Ok::<_, Infallible>(Event::default().event("endpoint").data(endpoint))
    });

    // The guard travels with the stream state; when the client disconnects
    // and axum drops the stream, the session deregisters.
    let responses = stream::unfold((events, guard), |(mut events, guard)| async move {
        let payload = events.recv().await?;
        Some((
            Ok(Event::default().event("message").data(payload)),
            (events, guard),
        ))
    });

    Ok(Sse::new(hello.chain(responses)).keep_alive(KeepAlive::default()))
}

#[derive(Deserialize)]
pub struct MessagesParams {
    session_id: String,
}

/// Accept one JSON-RPC request for an open session.
async fn messages_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(params): Query<MessagesParams>,
    Json(message): Json<Value>,
) -> Result<impl IntoResponse> {
    if state.db.get_user(&user_id).await?.is_none() {
        return Err(AppError::Unauthorized);
    }

    // The session must both exist and belong to the path identity.
    let owner = state.sessions.user_for(&params.session_id);
    if owner.as_deref() != Some(user_id.as_str())
        || !state.sessions.deliver(&params.session_id, message).await
    {
        return Err(AppError::NotFound("Session not found".to_string()));
    }

    Ok((StatusCode::ACCEPTED, "Accepted"))
}
