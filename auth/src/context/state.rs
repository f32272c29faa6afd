use std::fmt;

use campus_shared::types::{Principal, TokenClaims};
use serde::Serialize;

/// Lifecycle of the context within one process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Uninitialized,
    Initializing,
    Authenticated,
    Unauthenticated,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Uninitialized => "uninitialized",
            Self::Initializing => "initializing",
            Self::Authenticated => "authenticated",
            Self::Unauthenticated => "unauthenticated",
        };
        f.write_str(s)
    }
}

/// Read-only view handed to consumers.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub state: SessionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal: Option<Principal>,
    /// Token expiry (Unix seconds).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

/// Principal and token currently in effect.
#[derive(Debug, Clone)]
pub(crate) struct ActiveSession {
    pub(crate) principal: Principal,
    pub(crate) token: String,
    pub(crate) claims: TokenClaims,
}

#[derive(Debug)]
pub(crate) struct SessionSlot {
    pub(crate) state: SessionState,
    pub(crate) session: Option<ActiveSession>,
}

impl SessionSlot {
    pub(crate) fn new() -> Self {
        Self {
            state: SessionState::Uninitialized,
            session: None,
        }
    }

    pub(crate) fn set_authenticated(&mut self, session: ActiveSession) {
        self.session = Some(session);
        self.state = SessionState::Authenticated;
    }

    pub(crate) fn set_unauthenticated(&mut self) {
        self.session = None;
        self.state = SessionState::Unauthenticated;
    }

    pub(crate) fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            principal: self.session.as_ref().map(|s| s.principal.clone()),
            expires_at: self.session.as_ref().map(|s| s.claims.exp),
        }
    }
}
