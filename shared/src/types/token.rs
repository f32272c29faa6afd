use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::role::Role;

/// Claims carried in the payload segment of every bearer token.
///
/// The token is checked locally: validity is decided purely by comparing the
/// clock against `exp`. Nothing about the signature segment is verified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Principal id the token was minted for.
    pub sub: String,

    pub email: String,

    /// Role at authentication time. A later admin role switch does not
    /// re-mint the token, so this may differ from the live principal.
    pub role: Role,

    /// UUID v4 identifying this login.
    pub session_id: String,

    /// Issued-at (Unix timestamp, seconds).
    pub iat: i64,

    /// Expiry (Unix timestamp, seconds).
    pub exp: i64,
}

impl TokenClaims {
    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.exp
    }

    /// Seconds left before expiry, zero once expired.
    pub fn expires_in(&self, now: i64) -> u64 {
        u64::try_from(self.exp.saturating_sub(now)).unwrap_or(0)
    }
}

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("token segment is not valid base64: {0}")]
    Encoding(String),

    #[error("token payload error: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("token expired at {exp}")]
    Expired { exp: i64 },
}
