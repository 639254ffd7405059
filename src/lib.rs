// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! GSC Gateway: remote MCP server for Google Search Console
//!
//! This crate provides the backend that lets AI assistants query Search
//! Console on a user's behalf. Users sign in with Google once, receive an
//! opaque API key, and point their MCP client at the keyed SSE endpoint.

pub mod config;
pub mod db;
pub mod error;
pub mod mcp;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;
pub mod token;

use config::Config;
use db::Database;
use mcp::SessionRegistry;
use services::{CredentialService, OAuthFlow, SearchConsoleClient};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub flow: OAuthFlow,
    pub credentials: CredentialService,
    pub gsc: SearchConsoleClient,
    pub sessions: SessionRegistry,
}
