// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-connection MCP server.
//!
//! One instance exists per SSE stream and carries the identity that stream
//! authenticated as. Tool failures come back as `CallToolResult::error`
//! payloads inside successful JSON-RPC responses; only protocol-level
//! problems (unknown method, bad params) become JSON-RPC errors.

use crate::mcp::tools::{self, ToolContext};
use crate::services::{CredentialService, SearchConsoleClient};
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, Implementation, ListToolsResult,
    ProtocolVersion, ServerCapabilities, ServerInfo,
};
use serde_json::{json, Value};

const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;
const INTERNAL_ERROR: i64 = -32603;

/// MCP server bound to one resolved user.
pub struct McpServer {
    user_id: String,
    credentials: CredentialService,
    gsc: SearchConsoleClient,
}

impl McpServer {
    pub fn new(
        user_id: String,
        credentials: CredentialService,
        gsc: SearchConsoleClient,
    ) -> Self {
        Self {
            user_id,
            credentials,
            gsc,
        }
    }

    /// The identity every request on this connection runs as.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    fn handle_initialize(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Query Google Search Console for the authenticated property set: \
                 search analytics, keyword opportunities, sitemaps, URL inspection, \
                 and indexing requests."
                    .to_string(),
            ),
        }
    }

    fn handle_list_tools(&self) -> ListToolsResult {
        ListToolsResult {
            tools: tools::catalog(),
            next_cursor: None,
        }
    }

    async fn handle_call_tool(&self, request: CallToolRequestParam) -> CallToolResult {
        let args = request.arguments.unwrap_or_default();
        let ctx = ToolContext {
            user_id: &self.user_id,
            credentials: &self.credentials,
            gsc: &self.gsc,
        };

        match tools::dispatch(ctx, request.name.as_ref(), &args).await {
            Ok(text) => CallToolResult::success(vec![Content::text(text)]),
            Err(err) => {
                tracing::warn!(tool = %request.name, error = %err, "Tool call failed");
                CallToolResult::error(vec![Content::text(format!("Error: {}", err))])
            }
        }
    }

    /// Handle one JSON-RPC message. Returns `None` for notifications
    /// (requests without an id), which get no response.
    pub async fn handle_request(&self, request: Value) -> Option<Value> {
        let id = request.get("id").cloned().filter(|id| !id.is_null());
        let method = request.get("method").and_then(|m| m.as_str()).unwrap_or("");
        let params = request.get("params").cloned().unwrap_or(json!({}));

        let Some(id) = id else {
            tracing::debug!(method, "Ignoring notification");
            return None;
        };

        let result = match method {
            "initialize" => to_result(self.handle_initialize()),
            "ping" => Ok(json!({})),
            "tools/list" => to_result(self.handle_list_tools()),
            "tools/call" => match serde_json::from_value::<CallToolRequestParam>(params) {
                Ok(call) => to_result(self.handle_call_tool(call).await),
                Err(e) => Err(rpc_error(INVALID_PARAMS, &format!("Invalid params: {}", e))),
            },
            other => Err(rpc_error(
                METHOD_NOT_FOUND,
                &format!("Method not found: {}", other),
            )),
        };

        Some(match result {
            Ok(result) => json!({
                "jsonrpc": "2.0",
                "result": result,
                "id": id,
            }),
            Err(error) => json!({
                "jsonrpc": "2.0",
                "error": error,
                "id": id,
            }),
        })
    }
}

fn to_result<T: serde::Serialize>(value: T) -> Result<Value, Value> {
    serde_json::to_value(value)
        .map_err(|e| rpc_error(INTERNAL_ERROR, &format!("Serialization failed: {}", e)))
}

fn rpc_error(code: i64, message: &str) -> Value {
    json!({
        "code": code,
        "message": message,
    })
}
