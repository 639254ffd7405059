// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! SQLite store for user credentials and single-use OAuth states.
//!
//! Two tables back the whole gateway:
//! - `users`: opaque id -> email + serialized credential bundle. Rows are
//!   soft-deleted via `is_active`; an inactive row is indistinguishable from
//!   a missing one through this API.
//! - `oauth_states`: outstanding CSRF states for in-flight logins. A state
//!   is consumed by a single conditional DELETE, so concurrent callbacks
//!   can never both redeem the same value.
//!
//! Every mutation is one bound statement; there is no cross-call locking.

use crate::error::{AppError, Result};
use crate::models::{GoogleCredential, UserRecord};
use crate::time_utils::{format_utc_rfc3339, now_rfc3339};
use crate::token;
use chrono::{Duration, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::Row;

/// How long an issued OAuth state stays redeemable.
pub const STATE_TTL_MINUTES: i64 = 10;

/// SQLite database handle, cheap to clone.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the database at `database_url` and make
    /// sure the schema exists.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let url = if database_url.contains("::memory:") || database_url.contains('?') {
            database_url.to_string()
        } else {
            format!("{database_url}?mode=rwc")
        };

        let pool = SqlitePool::connect(&url).await?;
        let db = Self { pool };
        db.migrate().await?;

        tracing::info!(url = %database_url, "Connected to token database");
        Ok(db)
    }

    /// In-memory database for tests. Capped at one connection: each SQLite
    /// `:memory:` connection is its own database, so a wider pool would
    /// scatter the tables.
    pub async fn connect_in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Direct pool access (tests use this to manufacture edge-case rows).
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id          TEXT PRIMARY KEY,
                email       TEXT NOT NULL,
                credentials TEXT NOT NULL,
                created_at  TEXT NOT NULL,
                last_used   TEXT NOT NULL,
                is_active   INTEGER NOT NULL DEFAULT 1
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS oauth_states (
                state      TEXT PRIMARY KEY,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_oauth_states_created_at
             ON oauth_states (created_at)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // ─── Users ───────────────────────────────────────────────────

    /// Insert or update a user. New rows get `created_at = now`; updates
    /// keep the original `created_at` and `is_active`, so a refresh
    /// write-back can never resurrect a revoked user.
    pub async fn save_user(
        &self,
        user_id: &str,
        email: &str,
        credential: &GoogleCredential,
    ) -> Result<()> {
        let blob = serde_json::to_string(credential)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("serialize credential: {e}")))?;
        let now = now_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO users (id, email, credentials, created_at, last_used, is_active)
            VALUES (?1, ?2, ?3, ?4, ?4, 1)
            ON CONFLICT(id) DO UPDATE SET
                email = excluded.email,
                credentials = excluded.credentials,
                last_used = excluded.last_used
            "#,
        )
        .bind(user_id)
        .bind(email)
        .bind(&blob)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Look up an active user, bumping `last_used`. Inactive and unknown
    /// ids both come back as `None`.
    pub async fn get_user(&self, user_id: &str) -> Result<Option<UserRecord>> {
        let row = sqlx::query(
            "SELECT id, email, credentials, created_at
             FROM users WHERE id = ?1 AND is_active = 1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let now = now_rfc3339();
        sqlx::query("UPDATE users SET last_used = ?1 WHERE id = ?2")
            .bind(&now)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        let blob: String = row.get("credentials");
        let credential: GoogleCredential = serde_json::from_str(&blob).map_err(|e| {
            AppError::Internal(anyhow::anyhow!("corrupt credential bundle for {user_id}: {e}"))
        })?;

        Ok(Some(UserRecord {
            id: row.get("id"),
            email: row.get("email"),
            credential,
            created_at: row.get("created_at"),
            last_used: now,
            is_active: true,
        }))
    }

    /// Soft-delete a user. Returns whether an active row was present;
    /// repeat calls are harmless and report `false`.
    pub async fn deactivate_user(&self, user_id: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET is_active = 0 WHERE id = ?1 AND is_active = 1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // ─── OAuth States ────────────────────────────────────────────

    /// Mint and persist a fresh CSRF state token.
    pub async fn issue_state(&self) -> Result<String> {
        let state = token::random_urlsafe(token::STATE_BYTES)?;

        sqlx::query("INSERT INTO oauth_states (state, created_at) VALUES (?1, ?2)")
            .bind(&state)
            .bind(now_rfc3339())
            .execute(&self.pool)
            .await?;

        Ok(state)
    }

    /// Redeem a state token. True exactly once per issued value, and only
    /// within the TTL; unknown, replayed, and expired states are all the
    /// same `false`. The freshness predicate lives inside the DELETE, so
    /// an expired-but-unpurged row can never verify.
    pub async fn consume_state(&self, state: &str) -> Result<bool> {
        let cutoff = format_utc_rfc3339(Utc::now() - Duration::minutes(STATE_TTL_MINUTES));

        let result = sqlx::query("DELETE FROM oauth_states WHERE state = ?1 AND created_at > ?2")
            .bind(state)
            .bind(&cutoff)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Drop states past the TTL. Correctness does not depend on this
    /// running; it only keeps the table from accumulating dead rows.
    pub async fn purge_expired_states(&self) -> Result<u64> {
        let cutoff = format_utc_rfc3339(Utc::now() - Duration::minutes(STATE_TTL_MINUTES));

        let result = sqlx::query("DELETE FROM oauth_states WHERE created_at <= ?1")
            .bind(&cutoff)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
