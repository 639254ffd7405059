// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTML pages for the browser side of the flow: landing, callback
//! success, and error pages.

use axum::response::Html;
use axum::{routing::get, Router};
use std::sync::Arc;

use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/", get(home))
}

const PAGE_STYLE: &str = "background:#0a0a0f;color:#e0e0e0;font-family:system-ui,sans-serif;\
    display:flex;align-items:center;justify-content:center;min-height:100vh;margin:0;";
const CARD_STYLE: &str = "max-width:640px;padding:2rem;text-align:left;";
const CODE_STYLE: &str = "background:rgba(255,255,255,0.06);padding:1rem;border-radius:8px;\
    overflow-x:auto;font-size:0.85rem;";
const LINK_STYLE: &str = "color:#00ff88;";

/// Landing page with the sign-in link.
async fn home() -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Search Console MCP Gateway</title>
</head>
<body style="{PAGE_STYLE}">
<div style="{CARD_STYLE}text-align:center;">
<h1>Search Console MCP Gateway</h1>
<p>Connect your AI assistant to Google Search Console: search analytics,
keyword opportunities, sitemaps, URL inspection, and indexing requests.</p>
<p style="margin-top:2rem;"><a href="/oauth/login" style="{LINK_STYLE}font-size:1.2rem;">Sign in with Google →</a></p>
</div>
</body>
</html>"#
    ))
}

/// Callback success page: shows the API key and client setup snippet.
pub fn success_page(email: &str, user_id: &str, base_url: &str) -> String {
    let email = escape_html(email);
    let sse_url = format!("{}/mcp/{}/sse", base_url, user_id);

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Authentication Successful</title>
</head>
<body style="{PAGE_STYLE}">
<div style="{CARD_STYLE}">
<h1 style="color:#00ff88;">✅ Authentication Successful!</h1>
<p>Logged in as: {email}</p>
<h3>Your API key</h3>
<pre style="{CODE_STYLE}">{user_id}</pre>
<h3>Claude Desktop configuration</h3>
<pre style="{CODE_STYLE}">{{
  "mcpServers": {{
    "gscServer": {{
      "command": "npx",
      "args": ["-y", "mcp-remote", "{sse_url}"]
    }}
  }}
}}</pre>
<p>⚠️ Keep your API key secret. Anyone holding it can read your
Search Console data. Revoke it any time at
<a href="/oauth/revoke/{user_id}" style="{LINK_STYLE}">/oauth/revoke/{user_id}</a>.</p>
</div>
</body>
</html>"#
    )
}

/// Error page shared by the login and callback failure paths.
pub fn error_page(title: &str, message: &str) -> String {
    let title = escape_html(title);
    let message = escape_html(message);

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>{title}</title>
</head>
<body style="{PAGE_STYLE}">
<div style="{CARD_STYLE}text-align:center;">
<h1 style="color:#ff4444;">{title}</h1>
<p>{message}</p>
<p><a href="/" style="{LINK_STYLE}">Try again</a></p>
</div>
</body>
</html>"#
    )
}

/// Escape text interpolated into HTML. Provider error strings and email
/// addresses pass through here; everything else we render is our own.
fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<script>alert("x")</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt;"
        );
        assert_eq!(escape_html("a&b"), "a&amp;b");
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_success_page_embeds_endpoint() {
        let page = success_page("me@example.com", "abc123", "https://gsc.example.com");
        assert!(page.contains("https://gsc.example.com/mcp/abc123/sse"));
        assert!(page.contains("me@example.com"));
        assert!(page.contains("mcp-remote"));
    }

    #[test]
    fn test_error_page_escapes_message() {
        let page = error_page("Authentication Error", "<img src=x>");
        assert!(!page.contains("<img"));
        assert!(page.contains("&lt;img"));
    }
}
