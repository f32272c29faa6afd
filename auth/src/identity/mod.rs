//! Identity provider seam.
//!
//! The session context asks an [`IdentityProvider`] who an identifier is and
//! never holds a credential table itself. [`StaticFixtureProvider`] is the
//! only implementation: a fixed table of principals sharing one secret.

pub mod fixtures;

use campus_shared::types::{AppConfig, AuthError, Principal, Role};
use tracing::{debug, warn};

pub use self::fixtures::{DEMO_SECRET, demo_principals};

pub trait IdentityProvider: Send + Sync {
    /// Resolve `identifier` and check `secret`.
    ///
    /// Returns the principal as registered; the caller stamps `last_login`.
    fn authenticate(&self, identifier: &str, secret: &str) -> Result<Principal, AuthError>;

    /// The principal an admin lands on when previewing `role`.
    fn principal_for_role(&self, role: Role) -> Option<Principal>;

    /// All registered principals.
    fn principals(&self) -> Vec<Principal>;

    /// Principal provisioned when demo mode finds no session.
    fn default_principal(&self) -> Option<Principal> {
        self.principal_for_role(Role::Admin)
    }
}

#[derive(Debug, Clone)]
pub struct StaticFixtureProvider {
    principals: Vec<Principal>,
    secret: String,
}

impl StaticFixtureProvider {
    pub fn new(principals: Vec<Principal>, secret: impl Into<String>) -> Self {
        Self {
            principals,
            secret: secret.into(),
        }
    }

    /// Built-in demo accounts with the built-in secret.
    pub fn demo() -> Self {
        Self::new(demo_principals(), DEMO_SECRET)
    }

    /// Configured principal table (or the built-in one when the config lists
    /// none) with the resolved demo secret.
    pub fn from_config(config: &AppConfig) -> Self {
        let principals = if config.principals.is_empty() {
            demo_principals()
        } else {
            config.principals.clone()
        };

        let secret = config
            .auth
            .resolved_demo_secret()
            .unwrap_or_else(|| DEMO_SECRET.to_string());

        Self::new(principals, secret)
    }

    fn find(&self, identifier: &str) -> Option<&Principal> {
        let needle = identifier.trim();
        self.principals
            .iter()
            .find(|p| p.email.eq_ignore_ascii_case(needle))
    }
}

impl IdentityProvider for StaticFixtureProvider {
    fn authenticate(&self, identifier: &str, secret: &str) -> Result<Principal, AuthError> {
        let principal = self.find(identifier).ok_or_else(|| {
            warn!("User not found: {}", identifier.trim());
            AuthError::UserNotFound(identifier.trim().to_string())
        })?;

        if secret != self.secret {
            warn!("Invalid secret for user: {}", principal.email);
            return Err(AuthError::InvalidCredential);
        }

        debug!("Credentials accepted for: {}", principal.email);
        Ok(principal.clone())
    }

    fn principal_for_role(&self, role: Role) -> Option<Principal> {
        self.principals.iter().find(|p| p.role == role).cloned()
    }

    fn principals(&self) -> Vec<Principal> {
        self.principals.clone()
    }
}
