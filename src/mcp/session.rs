// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! SSE session registry: one entry per open stream, one identity per entry.
//!
//! The resolved user id never lives in process-global state. It is owned by
//! the per-session dispatcher task, so concurrent streams for different
//! users cannot observe or clobber each other's identity. Messages for one
//! session are handled serially, in arrival order.

use crate::mcp::server::McpServer;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Queued messages per session before POSTs start to wait.
const SESSION_INBOX_CAPACITY: usize = 32;

struct SessionEntry {
    user_id: String,
    inbox: mpsc::Sender<Value>,
}

/// Registry of live SSE sessions, shared across handlers.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<DashMap<String, SessionEntry>>,
}

/// A freshly opened session: the id to hand to the client, the stream of
/// outbound event payloads, and a guard that deregisters on drop.
pub struct OpenSession {
    pub session_id: String,
    pub events: mpsc::Receiver<String>,
    pub guard: SessionGuard,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new session around `server` (which owns the bound
    /// identity) and spawn its dispatcher task. The dispatcher drains the
    /// inbox one message at a time and pushes each response onto the event
    /// channel; it exits when the inbox closes (deregistration) or the
    /// stream side goes away.
    pub fn open(&self, server: McpServer) -> OpenSession {
        let session_id = Uuid::new_v4().simple().to_string();
        let (event_tx, event_rx) = mpsc::channel::<String>(SESSION_INBOX_CAPACITY);
        let (inbox_tx, mut inbox_rx) = mpsc::channel::<Value>(SESSION_INBOX_CAPACITY);

        self.sessions.insert(
            session_id.clone(),
            SessionEntry {
                user_id: server.user_id().to_string(),
                inbox: inbox_tx,
            },
        );

        let task_session = session_id.clone();
        tokio::spawn(async move {
            while let Some(message) = inbox_rx.recv().await {
                let Some(response) = server.handle_request(message).await else {
                    continue;
                };
                if event_tx.send(response.to_string()).await.is_err() {
                    // Client hung up; stop processing
                    break;
                }
            }
            tracing::debug!(session = %task_session, "Session dispatcher stopped");
        });

        OpenSession {
            guard: SessionGuard {
                registry: self.clone(),
                session_id: session_id.clone(),
            },
            session_id,
            events: event_rx,
        }
    }

    /// Queue a message for a session's dispatcher. `false` means the
    /// session is unknown or already closed.
    pub async fn deliver(&self, session_id: &str, message: Value) -> bool {
        // Clone the sender out so no map guard is held across the await
        let inbox = self
            .sessions
            .get(session_id)
            .map(|entry| entry.inbox.clone());

        match inbox {
            Some(inbox) => inbox.send(message).await.is_ok(),
            None => false,
        }
    }

    /// The identity a session is bound to, if it is still open.
    pub fn user_for(&self, session_id: &str) -> Option<String> {
        self.sessions
            .get(session_id)
            .map(|entry| entry.user_id.clone())
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    fn close(&self, session_id: &str) {
        if self.sessions.remove(session_id).is_some() {
            tracing::debug!(session = %session_id, "Session closed");
        }
    }
}

/// Removes the session entry when the SSE response body is dropped, which
/// is the only reliable disconnect signal axum gives us.
pub struct SessionGuard {
    registry: SessionRegistry,
    session_id: String,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.registry.close(&self.session_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::services::{CredentialService, GoogleAuthClient, SearchConsoleClient};

    async fn test_server(user_id: &str) -> McpServer {
        let db = Database::connect_in_memory().await.unwrap();
        let credentials = CredentialService::new(db, GoogleAuthClient::new());
        McpServer::new(user_id.to_string(), credentials, SearchConsoleClient::new())
    }

    #[tokio::test]
    async fn test_sessions_are_bound_and_isolated() {
        let registry = SessionRegistry::new();

        let alice = registry.open(test_server("user-alice").await);
        let bob = registry.open(test_server("user-bob").await);

        assert_ne!(alice.session_id, bob.session_id);
        assert_eq!(
            registry.user_for(&alice.session_id).as_deref(),
            Some("user-alice")
        );
        assert_eq!(
            registry.user_for(&bob.session_id).as_deref(),
            Some("user-bob")
        );
        assert_eq!(registry.active_sessions(), 2);
    }

    #[tokio::test]
    async fn test_guard_drop_tears_down_binding() {
        let registry = SessionRegistry::new();
        let session = registry.open(test_server("user-1").await);
        let session_id = session.session_id.clone();

        assert!(registry.user_for(&session_id).is_some());
        drop(session);
        assert!(registry.user_for(&session_id).is_none());
        assert!(!registry.deliver(&session_id, serde_json::json!({})).await);
    }

    #[tokio::test]
    async fn test_deliver_to_unknown_session_fails() {
        let registry = SessionRegistry::new();
        assert!(!registry.deliver("missing", serde_json::json!({})).await);
    }

    #[tokio::test]
    async fn test_dispatcher_answers_ping_in_order() {
        let registry = SessionRegistry::new();
        let mut session = registry.open(test_server("user-1").await);

        for id in 1..=3 {
            let delivered = registry
                .deliver(
                    &session.session_id,
                    serde_json::json!({"jsonrpc": "2.0", "method": "ping", "id": id}),
                )
                .await;
            assert!(delivered);
        }

        for id in 1..=3 {
            let payload = session.events.recv().await.expect("response expected");
            let response: Value = serde_json::from_str(&payload).unwrap();
            assert_eq!(response["id"], id);
            assert_eq!(response["jsonrpc"], "2.0");
        }
    }
}
