//! User model for storage and API.

use serde::{Deserialize, Serialize};

/// A registered user, keyed by the opaque id handed out after OAuth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    /// Opaque URL-safe id (also the bearer key for the MCP endpoint)
    pub id: String,
    /// Google account email, informational only
    pub email: String,
    /// Stored OAuth credential bundle
    pub credential: GoogleCredential,
    /// When the user first authenticated (RFC3339)
    pub created_at: String,
    /// Last successful credential lookup (RFC3339)
    pub last_used: String,
    /// False means soft-deleted; lookups treat the row as absent
    pub is_active: bool,
}

/// Everything needed to call Google APIs on a user's behalf.
///
/// Serialized as a JSON blob in the `credentials` column. The access token
/// rotates on refresh; every other field is fixed at first authorization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleCredential {
    pub access_token: String,
    /// Absent when Google did not re-issue one (`prompt=consent` makes that
    /// rare, but grants created before that parameter still lack it)
    pub refresh_token: Option<String>,
    pub token_uri: String,
    pub client_id: String,
    pub client_secret: String,
    pub scopes: Vec<String>,
    /// When `access_token` stops working (RFC3339); `None` for bundles that
    /// predate expiry tracking
    pub expires_at: Option<String>,
}

impl GoogleCredential {
    /// Whether the access token is expired or inside the refresh margin.
    /// Bundles without a recorded expiry are treated as live.
    pub fn is_expired(&self, margin_secs: i64) -> bool {
        match self
            .expires_at
            .as_deref()
            .and_then(crate::time_utils::parse_rfc3339)
        {
            Some(expiry) => {
                let cutoff = expiry - chrono::Duration::seconds(margin_secs);
                chrono::Utc::now() >= cutoff
            }
            None => false,
        }
    }
}
