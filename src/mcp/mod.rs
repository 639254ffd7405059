// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! MCP protocol layer: per-connection servers, session registry, tools.

pub mod server;
pub mod session;
pub mod tools;

pub use server::McpServer;
pub use session::SessionRegistry;
