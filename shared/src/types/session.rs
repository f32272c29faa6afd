use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::principal::Principal;

/// Keys of the two entries a session occupies in durable storage.
pub mod keys {
    /// JSON-serialized [`Principal`](crate::types::Principal).
    pub const PRINCIPAL: &str = "user";

    /// Bearer token string.
    pub const TOKEN: &str = "token";
}

/// The persisted pairing of a principal with its bearer token.
///
/// Never partially updated: every state change writes a whole new record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub principal: Principal,
    pub token: String,
}

impl SessionRecord {
    pub fn new(principal: Principal, token: String) -> Self {
        Self { principal, token }
    }
}

impl fmt::Display for SessionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // token stays out of logs
        write!(
            f,
            "principal_id={}, role={}, token_len={}",
            self.principal.id,
            self.principal.role,
            self.token.len()
        )
    }
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),
}
