// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod credentials;
pub mod google;
pub mod oauth;
pub mod search_console;

pub use credentials::CredentialService;
pub use google::GoogleAuthClient;
pub use oauth::{CallbackInput, LoginOutcome, OAuthFlow};
pub use search_console::SearchConsoleClient;
