// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Opaque token minting.
//!
//! User ids and CSRF states are raw OS randomness, URL-safe base64 without
//! padding. Nothing here is derivable or verifiable offline; the only check
//! anywhere is a store lookup.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use ring::rand::{SecureRandom, SystemRandom};

/// Entropy for opaque user ids.
pub const USER_ID_BYTES: usize = 20;

/// Entropy for single-use OAuth state tokens.
pub const STATE_BYTES: usize = 32;

/// Generate `len` random bytes as a URL-safe string.
pub fn random_urlsafe(len: usize) -> anyhow::Result<String> {
    let mut buf = vec![0u8; len];
    SystemRandom::new()
        .fill(&mut buf)
        .map_err(|_| anyhow::anyhow!("system RNG unavailable"))?;
    Ok(URL_SAFE_NO_PAD.encode(buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_tokens_are_urlsafe_and_unique() {
        let mut seen = HashSet::new();
        for _ in 0..100 {
            let token = random_urlsafe(STATE_BYTES).unwrap();
            // 32 bytes -> ceil(32 * 4 / 3) unpadded characters
            assert_eq!(token.len(), 43);
            assert!(token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
            assert!(seen.insert(token), "duplicate token generated");
        }
    }

    #[test]
    fn test_user_id_length() {
        let id = random_urlsafe(USER_ID_BYTES).unwrap();
        assert_eq!(id.len(), 27);
    }
}
