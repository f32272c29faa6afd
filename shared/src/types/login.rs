use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::principal::Principal;
use super::role::Role;
use super::session::StorageError;
use super::token::TokenError;

// ---------------------------------------------------------------------------
// Login wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(alias = "email")]
    pub identifier: String,
    #[serde(alias = "password")]
    pub secret: String,
}

/// Successful / failed login response envelope.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LoginResponse {
    Success {
        principal: Principal,
        expires_in: u64,
        message: String,
    },
    Error {
        code: String,
        message: String,
    },
}

/// Envelope for the non-login session commands (logout, role switch,
/// profile update).
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SessionResponse {
    Success {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        principal: Option<Principal>,
    },
    Error {
        code: String,
        message: String,
    },
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Everything the session context can report back to a caller.
///
/// `UserNotFound` and `InvalidCredential` are the expected, recoverable
/// outcomes of a bad login and are meant to be rendered inline.
/// `CorruptedSession` is only produced while restoring from storage and is
/// absorbed by initialization.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("no principal registered for '{0}'")]
    UserNotFound(String),

    #[error("invalid credential")]
    InvalidCredential,

    #[error("no active session")]
    NoActiveSession,

    #[error("role switch refused: current role is {from}")]
    UnauthorizedRoleSwitch { from: Role },

    #[error("no principal configured for role {0}")]
    UnknownRole(Role),

    #[error("corrupted session record: {0}")]
    CorruptedSession(String),

    #[error("an authentication attempt is already in progress")]
    AuthenticationInProgress,

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Token(#[from] TokenError),
}

impl AuthError {
    pub fn to_code(&self) -> &'static str {
        match self {
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::InvalidCredential => "INVALID_CREDENTIAL",
            Self::NoActiveSession => "NO_ACTIVE_SESSION",
            Self::UnauthorizedRoleSwitch { .. } => "UNAUTHORIZED_ROLE_SWITCH",
            Self::UnknownRole(_) => "UNKNOWN_ROLE",
            Self::CorruptedSession(_) => "CORRUPTED_SESSION",
            Self::AuthenticationInProgress => "AUTHENTICATION_IN_PROGRESS",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Token(_) => "TOKEN_ERROR",
        }
    }

    pub fn to_message(&self) -> String {
        match self {
            Self::UserNotFound(_) => "User not found".to_string(),
            Self::InvalidCredential => "Invalid email or password".to_string(),
            Self::NoActiveSession => "You are not signed in".to_string(),
            Self::UnauthorizedRoleSwitch { .. } => {
                "Only administrators can switch roles".to_string()
            }
            Self::UnknownRole(role) => format!("No demo account for role: {}", role),
            Self::CorruptedSession(_) => "Stored session was unreadable".to_string(),
            Self::AuthenticationInProgress => "Sign-in already in progress".to_string(),
            Self::Storage(_) => "Session storage error occurred".to_string(),
            Self::Token(_) => "Session token error occurred".to_string(),
        }
    }

    /// Recoverable errors are the ones a user can fix by trying again.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Storage(_) | Self::Token(_))
    }

    pub fn to_response(&self) -> LoginResponse {
        LoginResponse::Error {
            code: self.to_code().to_string(),
            message: self.to_message(),
        }
    }

    pub fn to_session_response(&self) -> SessionResponse {
        SessionResponse::Error {
            code: self.to_code().to_string(),
            message: self.to_message(),
        }
    }
}
