// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google OAuth endpoints: authorization URL, code exchange, userinfo,
//! token refresh.
//!
//! This client is credential-free; callers pass the client id/secret per
//! call. The refresh grant in particular uses the id, secret, and token
//! endpoint stored inside the user's credential bundle, not live config,
//! so older grants keep refreshing even after a config change.

use crate::error::AppError;
use crate::models::GoogleCredential;
use serde::Deserialize;

pub const GOOGLE_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
pub const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URI: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// Scopes requested at login. Offline Search Console access plus enough
/// identity to label the account.
pub const SCOPES: [&str; 5] = [
    "https://www.googleapis.com/auth/webmasters",
    "https://www.googleapis.com/auth/webmasters.readonly",
    "https://www.googleapis.com/auth/userinfo.email",
    "https://www.googleapis.com/auth/indexing",
    "openid",
];

/// Google OAuth client.
#[derive(Clone)]
pub struct GoogleAuthClient {
    http: reqwest::Client,
    auth_uri: String,
    token_uri: String,
    userinfo_uri: String,
}

impl Default for GoogleAuthClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GoogleAuthClient {
    /// Client against the real Google endpoints.
    pub fn new() -> Self {
        Self::with_endpoints(GOOGLE_AUTH_URI, GOOGLE_TOKEN_URI, GOOGLE_USERINFO_URI)
    }

    /// Client with overridden endpoints (tests point these at a local
    /// stand-in server).
    pub fn with_endpoints(
        auth_uri: impl Into<String>,
        token_uri: impl Into<String>,
        userinfo_uri: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            auth_uri: auth_uri.into(),
            token_uri: token_uri.into(),
            userinfo_uri: userinfo_uri.into(),
        }
    }

    /// The token endpoint new credential bundles should record.
    pub fn token_uri(&self) -> &str {
        &self.token_uri
    }

    /// Build the authorization redirect URL for a login attempt.
    ///
    /// `access_type=offline` asks for a refresh token; `prompt=consent`
    /// forces Google to re-issue one even for repeat logins, otherwise only
    /// the first grant ever carries it.
    pub fn authorization_url(&self, client_id: &str, redirect_uri: &str, state: &str) -> String {
        let scope = SCOPES.join(" ");

        format!(
            "{}?client_id={}&\
             redirect_uri={}&\
             scope={}&\
             state={}&\
             response_type=code&\
             access_type=offline&\
             include_granted_scopes=true&\
             prompt=consent",
            self.auth_uri,
            urlencoding::encode(client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(&scope),
            urlencoding::encode(state),
        )
    }

    /// Exchange an authorization code for a token bundle.
    pub async fn exchange_code(
        &self,
        client_id: &str,
        client_secret: &str,
        redirect_uri: &str,
        code: &str,
    ) -> Result<TokenResponse, AppError> {
        let response = self
            .http
            .post(&self.token_uri)
            .form(&[
                ("code", code),
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("redirect_uri", redirect_uri),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| AppError::OAuth(format!("Token exchange request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::OAuth(error_text(response).await));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::OAuth(format!("Token response parse error: {}", e)))
    }

    /// Fetch the account email for a freshly issued access token. Missing
    /// email (scope not granted) degrades to an empty string; the address
    /// is informational only.
    pub async fn fetch_user_email(&self, access_token: &str) -> Result<String, AppError> {
        let response = self
            .http
            .get(&self.userinfo_uri)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::OAuth(format!("Userinfo request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::OAuth(error_text(response).await));
        }

        let info: UserInfo = response
            .json()
            .await
            .map_err(|e| AppError::OAuth(format!("Userinfo parse error: {}", e)))?;

        Ok(info.email.unwrap_or_default())
    }

    /// Refresh an expired access token using the stored grant.
    pub async fn refresh_access_token(
        &self,
        credential: &GoogleCredential,
    ) -> Result<TokenRefreshResponse, AppError> {
        let refresh_token = credential
            .refresh_token
            .as_deref()
            .ok_or_else(|| AppError::Refresh("no refresh token on record".to_string()))?;

        let response = self
            .http
            .post(&credential.token_uri)
            .form(&[
                ("client_id", credential.client_id.as_str()),
                ("client_secret", credential.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| AppError::Refresh(format!("Token refresh request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Refresh(error_text(response).await));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Refresh(format!("Refresh response parse error: {}", e)))
    }
}

/// Best-effort error body for failed provider calls.
async fn error_text(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    format!("HTTP {}: {}", status, body)
}

/// Token endpoint response for the authorization-code grant.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

/// Token endpoint response for the refresh grant.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRefreshResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    #[serde(default)]
    email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_url_contains_offline_consent() {
        let client = GoogleAuthClient::new();
        let url = client.authorization_url(
            "client-123",
            "http://localhost:8080/oauth/callback",
            "state-abc",
        );

        assert!(url.starts_with(GOOGLE_AUTH_URI));
        assert!(url.contains("client_id=client-123"));
        assert!(url.contains("state=state-abc"));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("prompt=consent"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains(
            "redirect_uri=http%3A%2F%2Flocalhost%3A8080%2Foauth%2Fcallback"
        ));
    }

    #[test]
    fn test_authorization_url_encodes_scopes() {
        let client = GoogleAuthClient::new();
        let url = client.authorization_url("c", "http://localhost/cb", "s");

        // Scopes are space-joined then percent-encoded
        assert!(url.contains("webmasters.readonly"));
        assert!(url.contains("%20openid"));
        assert!(!url.contains(" "));
    }

    #[test]
    fn test_token_response_tolerates_missing_fields() {
        let parsed: TokenResponse =
            serde_json::from_str(r#"{"access_token": "abc"}"#).unwrap();
        assert_eq!(parsed.access_token, "abc");
        assert_eq!(parsed.refresh_token, None);
        assert_eq!(parsed.expires_in, None);
    }
}
