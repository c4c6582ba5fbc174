//! Password reset tokens.
//!
//! A reset token is a one-time credential handed to the user by email. Only
//! its SHA-256 digest is stored server-side: the digest is a lookup key, not
//! a password, so the slow Argon2 hasher is deliberately not used here. The
//! plaintext has 32 bytes of OS entropy and the digest is deterministic, so
//! the stored hash finds the account on redemption without a table scan.

use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::time::Duration;

/// A freshly issued reset token.
///
/// `plaintext` goes to the user (once, by email) and is never persisted;
/// `digest` and `expires_at` are what the account record stores.
#[derive(Debug, Clone)]
pub struct ResetToken {
    pub plaintext: String,
    pub digest: String,
    pub expires_at: DateTime<Utc>,
}

/// Generate a new reset token valid for `ttl` from now.
pub fn issue_reset_token(ttl: Duration) -> ResetToken {
    // 32 bytes (256 bits) of cryptographically secure random data,
    // encoded as base64url without padding
    let mut token_bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut token_bytes);
    let plaintext = general_purpose::URL_SAFE_NO_PAD.encode(token_bytes);

    ResetToken {
        digest: digest(&plaintext),
        plaintext,
        expires_at: Utc::now() + ttl,
    }
}

/// Deterministic one-way digest of a reset token, hex-encoded.
pub fn digest(plaintext: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(plaintext.as_bytes());
    let out = hasher.finalize();
    out.iter().map(|b| format!("{b:02x}")).collect()
}

/// Check a candidate token against the stored digest and expiry.
pub fn verify_reset_token(plaintext: &str, stored_digest: &str, stored_expiry: DateTime<Utc>) -> bool {
    stored_expiry > Utc::now() && digest(plaintext) == stored_digest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_reset_token_shape() {
        let token1 = issue_reset_token(Duration::from_secs(600));
        let token2 = issue_reset_token(Duration::from_secs(600));

        // Tokens should be different
        assert_ne!(token1.plaintext, token2.plaintext);

        // base64url of 32 bytes without padding is 43 chars
        assert_eq!(token1.plaintext.len(), 43);
        assert!(token1
            .plaintext
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert!(!token1.plaintext.contains('='));

        // Hex-encoded SHA-256 digest is 64 chars
        assert_eq!(token1.digest.len(), 64);
        assert_ne!(token1.digest, token1.plaintext);
    }

    #[test]
    fn test_digest_is_deterministic() {
        let token = issue_reset_token(Duration::from_secs(600));
        assert_eq!(digest(&token.plaintext), token.digest);
        assert_ne!(digest("some-other-value"), token.digest);
    }

    #[test]
    fn test_verify_reset_token() {
        let token = issue_reset_token(Duration::from_secs(600));
        assert!(verify_reset_token(&token.plaintext, &token.digest, token.expires_at));

        // Wrong plaintext fails
        assert!(!verify_reset_token("nope", &token.digest, token.expires_at));

        // Expired token fails even with the right plaintext
        let past = Utc::now() - chrono::Duration::seconds(1);
        assert!(!verify_reset_token(&token.plaintext, &token.digest, past));
    }
}
