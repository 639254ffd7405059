// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OAuth login flow: login redirect through callback to a stored user.
//!
//! The flow is CSRF-guarded by single-use state tokens. States are consumed
//! destructively before the code exchange, so a replayed callback fails the
//! state check instead of racing the exchange.

use crate::config::Config;
use crate::db::Database;
use crate::error::{AppError, Result};
use crate::models::GoogleCredential;
use crate::services::google::{GoogleAuthClient, SCOPES};
use crate::time_utils::format_utc_rfc3339;
use crate::token;
use chrono::{Duration, Utc};

/// Inputs delivered to the callback redirect.
#[derive(Debug, Default)]
pub struct CallbackInput {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Successful callback outcome, for display to the user.
#[derive(Debug)]
pub struct LoginOutcome {
    pub user_id: String,
    pub email: String,
}

/// Drives the authorization-code flow against Google.
#[derive(Clone)]
pub struct OAuthFlow {
    db: Database,
    google: GoogleAuthClient,
    client_id: Option<String>,
    client_secret: Option<String>,
    redirect_uri: String,
}

impl OAuthFlow {
    pub fn new(config: &Config, db: Database, google: GoogleAuthClient) -> Self {
        Self {
            db,
            google,
            client_id: config.google_client_id.clone(),
            client_secret: config.google_client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
        }
    }

    fn client(&self) -> Result<(&str, &str)> {
        match (&self.client_id, &self.client_secret) {
            (Some(id), Some(secret)) => Ok((id.as_str(), secret.as_str())),
            _ => Err(AppError::Config(
                "GOOGLE_CLIENT_ID and GOOGLE_CLIENT_SECRET must be set".to_string(),
            )),
        }
    }

    /// Start a login attempt: purge stale states, issue a fresh one, and
    /// build the authorization redirect URL.
    pub async fn begin_login(&self) -> Result<String> {
        let (client_id, _) = self.client()?;

        let purged = self.db.purge_expired_states().await?;
        if purged > 0 {
            tracing::debug!(purged, "Dropped expired OAuth states");
        }

        let state = self.db.issue_state().await?;
        let url = self
            .google
            .authorization_url(client_id, &self.redirect_uri, &state);

        tracing::info!("Starting OAuth flow, redirecting to Google");
        Ok(url)
    }

    /// Finish a login attempt from the callback parameters.
    ///
    /// Branch order matters: a provider-reported error wins, then the state
    /// check, then the code exchange. Nothing is persisted until every step
    /// has succeeded, so a failed attempt leaves no partial user row.
    pub async fn complete_login(&self, input: CallbackInput) -> Result<LoginOutcome> {
        if let Some(error) = input.error {
            tracing::warn!(error = %error, "OAuth error from Google");
            return Err(AppError::BadRequest(format!("OAuth error: {}", error)));
        }

        let consumed = match input.state.as_deref() {
            Some(state) => self.db.consume_state(state).await?,
            None => false,
        };
        if !consumed {
            return Err(AppError::InvalidState);
        }

        let code = input
            .code
            .ok_or_else(|| AppError::BadRequest("Missing authorization code".to_string()))?;

        let (client_id, client_secret) = self.client()?;
        let tokens = self
            .google
            .exchange_code(client_id, client_secret, &self.redirect_uri, &code)
            .await?;

        let email = self.google.fetch_user_email(&tokens.access_token).await?;

        let user_id = token::random_urlsafe(token::USER_ID_BYTES)?;
        let credential = GoogleCredential {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            token_uri: self.google.token_uri().to_string(),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            scopes: SCOPES.iter().map(|s| s.to_string()).collect(),
            expires_at: tokens
                .expires_in
                .map(|secs| format_utc_rfc3339(Utc::now() + Duration::seconds(secs))),
        };

        self.db.save_user(&user_id, &email, &credential).await?;

        tracing::info!(email = %email, "OAuth successful, user stored");
        Ok(LoginOutcome { user_id, email })
    }

    /// Soft-delete a user. `false` means there was nothing active to revoke.
    pub async fn revoke(&self, user_id: &str) -> Result<bool> {
        let revoked = self.db.deactivate_user(user_id).await?;
        if revoked {
            tracing::info!("User access revoked");
        }
        Ok(revoked)
    }
}
