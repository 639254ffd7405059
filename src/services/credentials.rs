// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Credential resolution with lazy refresh.

use crate::db::Database;
use crate::error::{AppError, Result};
use crate::models::GoogleCredential;
use crate::services::google::GoogleAuthClient;
use crate::time_utils::format_utc_rfc3339;
use chrono::{Duration, Utc};

/// Margin before token expiration when we proactively refresh.
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

/// Resolves an opaque user id to a live Google credential.
///
/// Two tasks racing on the same expiring token may both run the refresh
/// grant; both derive from the same refresh token, Google hands each a
/// valid access token, and the second write-back simply wins. That
/// duplication is accepted, so there is no per-user lock here, and no
/// cache either: every lookup must also bump the user's `last_used`.
#[derive(Clone)]
pub struct CredentialService {
    db: Database,
    google: GoogleAuthClient,
}

impl CredentialService {
    pub fn new(db: Database, google: GoogleAuthClient) -> Self {
        Self { db, google }
    }

    /// Fetch the stored credential for `user_id`, refreshing the access
    /// token first if it is expired and a refresh token is on record.
    ///
    /// A refresh failure propagates without touching the store; the user
    /// record stays active so the owner can simply re-authenticate.
    pub async fn resolve(&self, user_id: &str) -> Result<GoogleCredential> {
        let user = self
            .db
            .get_user(user_id)
            .await?
            .ok_or(AppError::Unauthorized)?;

        let mut credential = user.credential;

        if credential.is_expired(TOKEN_REFRESH_MARGIN_SECS) && credential.refresh_token.is_some() {
            tracing::info!(email = %user.email, "Access token expired, refreshing");

            let refreshed = self.google.refresh_access_token(&credential).await?;

            credential.access_token = refreshed.access_token;
            credential.expires_at = refreshed
                .expires_in
                .map(|secs| format_utc_rfc3339(Utc::now() + Duration::seconds(secs)));

            self.db
                .save_user(user_id, &user.email, &credential)
                .await?;
        }

        Ok(credential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GoogleCredential;

    fn fresh_credential() -> GoogleCredential {
        GoogleCredential {
            access_token: "live-token".to_string(),
            refresh_token: Some("refresh".to_string()),
            token_uri: "http://127.0.0.1:1/token".to_string(),
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
            scopes: vec!["openid".to_string()],
            expires_at: Some(format_utc_rfc3339(Utc::now() + Duration::hours(1))),
        }
    }

    #[tokio::test]
    async fn test_unknown_user_is_unauthorized() {
        let db = Database::connect_in_memory().await.unwrap();
        let service = CredentialService::new(db, GoogleAuthClient::new());

        assert!(matches!(
            service.resolve("nobody").await.unwrap_err(),
            AppError::Unauthorized
        ));
    }

    #[tokio::test]
    async fn test_fresh_token_returned_without_network() {
        let db = Database::connect_in_memory().await.unwrap();
        db.save_user("u1", "a@b.com", &fresh_credential())
            .await
            .unwrap();

        // token_uri points at a dead port; a refresh attempt would error,
        // so success here proves no network call happened
        let service = CredentialService::new(db, GoogleAuthClient::new());
        let credential = service.resolve("u1").await.unwrap();

        assert_eq!(credential.access_token, "live-token");
    }

    #[tokio::test]
    async fn test_expired_without_refresh_token_returned_as_is() {
        let db = Database::connect_in_memory().await.unwrap();
        let mut credential = fresh_credential();
        credential.refresh_token = None;
        credential.expires_at = Some(format_utc_rfc3339(Utc::now() - Duration::hours(1)));
        db.save_user("u1", "a@b.com", &credential).await.unwrap();

        let service = CredentialService::new(db, GoogleAuthClient::new());
        let resolved = service.resolve("u1").await.unwrap();

        assert_eq!(resolved.access_token, "live-token");
        assert_eq!(resolved.refresh_token, None);
    }

    #[tokio::test]
    async fn test_refresh_failure_leaves_store_untouched() {
        let db = Database::connect_in_memory().await.unwrap();
        let mut credential = fresh_credential();
        credential.expires_at = Some(format_utc_rfc3339(Utc::now() - Duration::hours(1)));
        db.save_user("u1", "a@b.com", &credential).await.unwrap();

        // token_uri is unreachable, so the refresh attempt fails
        let service = CredentialService::new(db.clone(), GoogleAuthClient::new());
        assert!(matches!(
            service.resolve("u1").await.unwrap_err(),
            AppError::Refresh(_)
        ));

        let stored = db.get_user("u1").await.unwrap().unwrap();
        assert_eq!(stored.credential.access_token, "live-token");
    }
}
