//! The session / authorization context.
//!
//! One [`AuthContext`] is built at the application root and cloned into every
//! consumer. Clones share state, so a login seen by one view is seen by all.
//!
//! # State machine
//!
//! ```text
//! Uninitialized ──initialize()──► Initializing ──► Authenticated
//!                                        │               ▲   │ switch_role / update_principal
//!                                        ▼               │   ▼ (self-loop)
//!                                 Unauthenticated ◄──end_session()
//!                                        │
//!                                        └─ auto_provision ─► Authenticated (default admin)
//! ```
//!
//! Every state change writes the whole session to storage before it becomes
//! visible in memory.

mod state;

pub use self::state::{SessionSnapshot, SessionState};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use campus_shared::types::{
    AuthError, AuthSettings, Principal, PrincipalPatch, Role, SessionRecord, TokenClaims,
    TokenError,
};
use tokio::sync::{RwLock, RwLockWriteGuard};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use self::state::{ActiveSession, SessionSlot};
use crate::clock::{Clock, SystemClock};
use crate::identity::{IdentityProvider, StaticFixtureProvider};
use crate::storage::{self, SessionStorage};
use crate::token::{TokenCodec, UnsignedTokenCodec};

// ---------------------------------------------------------------------------
// AuthContext
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct AuthContext {
    inner: Arc<AuthContextInner>,
}

struct AuthContextInner {
    provider: Arc<dyn IdentityProvider>,
    codec: Arc<dyn TokenCodec>,
    storage: Arc<dyn SessionStorage>,
    clock: Arc<dyn Clock>,
    settings: AuthSettings,
    slot: RwLock<SessionSlot>,
    /// Set while an `authenticate` call is in flight.
    login_pending: AtomicBool,
}

impl std::fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // settings hold the demo secret
        f.debug_struct("AuthContext")
            .field("token_ttl_minutes", &self.inner.settings.token_ttl_minutes)
            .field("auto_provision", &self.inner.settings.auto_provision)
            .field(
                "login_pending",
                &self.inner.login_pending.load(Ordering::Relaxed),
            )
            .finish()
    }
}

impl AuthContext {
    pub fn builder(storage: Arc<dyn SessionStorage>, settings: AuthSettings) -> AuthContextBuilder {
        AuthContextBuilder::new(storage, settings)
    }

    pub fn settings(&self) -> &AuthSettings {
        &self.inner.settings
    }

    pub fn provider(&self) -> &Arc<dyn IdentityProvider> {
        &self.inner.provider
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────────

    /// Restore a persisted session (the "page load").
    ///
    /// Never fails: a missing, corrupt or expired record leaves the context
    /// `Unauthenticated`, and the bad record is removed from storage. With
    /// `auto_provision` on, that outcome is immediately replaced by a fresh
    /// session for the provider's default principal.
    pub async fn initialize(&self) -> SessionState {
        let mut slot = self.inner.slot.write().await;
        slot.state = SessionState::Initializing;
        debug!("Initializing session context");

        match self.restore() {
            Ok(Some(active)) => {
                info!(
                    "Restored session for {} ({})",
                    active.principal.email, active.principal.role
                );
                slot.set_authenticated(active);
            }
            Ok(None) => {
                debug!("No persisted session found");
                slot.set_unauthenticated();
            }
            Err(e) => {
                match &e {
                    AuthError::Token(TokenError::Expired { exp }) => {
                        info!("Persisted session expired at {}, discarding", exp)
                    }
                    other => warn!("Discarding persisted session: {}", other),
                }
                if let Err(e) = storage::clear_session(self.inner.storage.as_ref()) {
                    error!("Failed to clear persisted session: {}", e);
                }
                slot.set_unauthenticated();
            }
        }

        if slot.state == SessionState::Unauthenticated && self.inner.settings.auto_provision {
            self.provision_default(&mut slot);
        }

        slot.state
    }

    /// Check the current token against the clock; end the session if it has
    /// expired.
    pub async fn revalidate(&self) -> SessionState {
        let mut slot = self.inner.slot.write().await;
        let now = self.inner.clock.now();

        let expired = match &slot.session {
            Some(active) => self.inner.codec.validate(&active.token, now).is_err(),
            None => false,
        };

        if expired {
            info!("Session token expired, ending session");
            if let Err(e) = storage::clear_session(self.inner.storage.as_ref()) {
                error!("Failed to clear persisted session: {}", e);
            }
            slot.set_unauthenticated();
        }

        slot.state
    }

    // ── Commands ──────────────────────────────────────────────────────────────

    /// Log in with an identifier (email) and the shared secret.
    ///
    /// Waits `login_delay_ms` first. Only one call may be in flight; a second
    /// one fails with [`AuthError::AuthenticationInProgress`]. Nothing is
    /// changed on failure.
    pub async fn authenticate(&self, identifier: &str, secret: &str) -> Result<Principal, AuthError> {
        let _pending = LoginGuard::acquire(&self.inner.login_pending).ok_or_else(|| {
            warn!("Rejected concurrent login for: {}", identifier.trim());
            AuthError::AuthenticationInProgress
        })?;

        info!("Attempting login for user: {}", identifier.trim());

        let delay = self.inner.settings.login_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let principal = self.inner.provider.authenticate(identifier, secret)?;
        let active = self.mint(principal)?;

        let mut slot = self.inner.slot.write().await;
        let principal = self.commit(&mut slot, active)?;

        info!(
            "User logged in successfully: {} (ID: {})",
            principal.email, principal.id
        );
        Ok(principal)
    }

    /// Sign out. Always succeeds; storage failures are only logged.
    pub async fn end_session(&self) {
        let mut slot = self.inner.slot.write().await;

        if let Err(e) = storage::clear_session(self.inner.storage.as_ref()) {
            error!("Failed to clear persisted session: {}", e);
        }

        if let Some(active) = &slot.session {
            info!("User logged out: {}", active.principal.email);
        }
        slot.set_unauthenticated();
    }

    /// Shallow-merge `patch` into the current principal and persist it.
    pub async fn update_principal(&self, patch: PrincipalPatch) -> Result<Principal, AuthError> {
        let mut slot = self.inner.slot.write().await;

        let Some(active) = slot.session.as_ref() else {
            debug!("Profile update without a session");
            return Err(AuthError::NoActiveSession);
        };

        let mut updated = active.clone();
        updated.principal.apply(patch);

        let principal = self.commit(&mut slot, updated)?;
        info!("Profile updated for: {}", principal.email);
        Ok(principal)
    }

    /// Admin-only preview of another role. `false` leaves the principal
    /// unchanged.
    pub async fn switch_role(&self, target: Role) -> bool {
        match self.try_switch_role(target).await {
            Ok(_) => true,
            Err(e) => {
                warn!("Role switch to {} refused: {}", target, e);
                false
            }
        }
    }

    /// [`switch_role`](Self::switch_role) with the reason for a refusal.
    ///
    /// The token is carried over untouched, so the switched session expires
    /// when the original login would have.
    pub async fn try_switch_role(&self, target: Role) -> Result<Principal, AuthError> {
        let mut slot = self.inner.slot.write().await;

        let active = slot.session.as_ref().ok_or(AuthError::NoActiveSession)?;
        let from = active.principal.role;

        if from != Role::Admin {
            return Err(AuthError::UnauthorizedRoleSwitch { from });
        }

        let mut principal = self
            .inner
            .provider
            .principal_for_role(target)
            .ok_or(AuthError::UnknownRole(target))?;
        principal.switched_from = Some(from);
        principal.last_login = self.inner.clock.now();

        let switched = ActiveSession {
            principal,
            token: active.token.clone(),
            claims: active.claims.clone(),
        };

        let principal = self.commit(&mut slot, switched)?;
        info!("Switched role {} -> {} ({})", from, target, principal.email);
        Ok(principal)
    }

    // ── Queries ───────────────────────────────────────────────────────────────

    /// Closed default: false when nobody is signed in.
    pub async fn has_permission(&self, capability: &str) -> bool {
        let slot = self.inner.slot.read().await;
        slot.session
            .as_ref()
            .is_some_and(|s| s.principal.has_permission(capability))
    }

    pub async fn has_role(&self, role: Role) -> bool {
        let slot = self.inner.slot.read().await;
        slot.session
            .as_ref()
            .is_some_and(|s| s.principal.has_role(role))
    }

    pub async fn is_admin(&self) -> bool {
        self.has_role(Role::Admin).await
    }

    pub async fn is_faculty(&self) -> bool {
        self.has_role(Role::Faculty).await
    }

    pub async fn is_student(&self) -> bool {
        self.has_role(Role::Student).await
    }

    pub async fn principal(&self) -> Option<Principal> {
        let slot = self.inner.slot.read().await;
        slot.session.as_ref().map(|s| s.principal.clone())
    }

    pub async fn state(&self) -> SessionState {
        self.inner.slot.read().await.state
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.inner.slot.read().await.snapshot()
    }

    /// Seconds until the current token expires.
    pub async fn expires_in(&self) -> Option<u64> {
        let now = self.inner.clock.now();
        let slot = self.inner.slot.read().await;
        slot.session.as_ref().map(|s| s.claims.expires_in(now))
    }

    // ── Internals ─────────────────────────────────────────────────────────────

    fn restore(&self) -> Result<Option<ActiveSession>, AuthError> {
        let Some(record) = storage::load_session(self.inner.storage.as_ref())? else {
            return Ok(None);
        };

        let claims = self
            .inner
            .codec
            .validate(&record.token, self.inner.clock.now())
            .map_err(|e| match e {
                TokenError::Expired { .. } => AuthError::Token(e),
                other => AuthError::CorruptedSession(format!("token: {}", other)),
            })?;

        Ok(Some(ActiveSession {
            principal: record.principal,
            token: record.token,
            claims,
        }))
    }

    /// Stamp `last_login` and issue a fresh token.
    fn mint(&self, mut principal: Principal) -> Result<ActiveSession, AuthError> {
        let now = self.inner.clock.now();
        principal.last_login = now;

        let claims = TokenClaims {
            sub: principal.id.clone(),
            email: principal.email.clone(),
            role: principal.role,
            session_id: Uuid::new_v4().to_string(),
            iat: now,
            exp: now.saturating_add(self.inner.settings.token_ttl_secs()),
        };
        let token = self.inner.codec.encode(&claims)?;

        Ok(ActiveSession {
            principal,
            token,
            claims,
        })
    }

    /// Persist, then publish. On a storage error memory is left as it was.
    fn commit(
        &self,
        slot: &mut RwLockWriteGuard<'_, SessionSlot>,
        active: ActiveSession,
    ) -> Result<Principal, AuthError> {
        let record = SessionRecord::new(active.principal.clone(), active.token.clone());
        storage::save_session(self.inner.storage.as_ref(), &record).map_err(|e| {
            error!("Failed to persist session: {}", e);
            e
        })?;

        let principal = active.principal.clone();
        slot.set_authenticated(active);
        Ok(principal)
    }

    fn provision_default(&self, slot: &mut RwLockWriteGuard<'_, SessionSlot>) {
        let Some(principal) = self.inner.provider.default_principal() else {
            warn!("auto_provision is on but the provider has no default principal");
            return;
        };

        warn!(
            "No session found; auto-provisioning demo session for {}",
            principal.email
        );

        let result = self
            .mint(principal)
            .and_then(|active| self.commit(slot, active));

        if let Err(e) = result {
            error!("Auto-provisioning failed: {}", e);
            slot.set_unauthenticated();
        }
    }
}

// ---------------------------------------------------------------------------
// Single-flight guard
// ---------------------------------------------------------------------------

/// Holds the login-pending flag; released on drop, including when the
/// `authenticate` future is cancelled mid-delay.
struct LoginGuard<'a>(&'a AtomicBool);

impl<'a> LoginGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for LoginGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Defaults: [`StaticFixtureProvider::demo`], [`UnsignedTokenCodec`],
/// [`SystemClock`].
pub struct AuthContextBuilder {
    storage: Arc<dyn SessionStorage>,
    settings: AuthSettings,
    provider: Option<Arc<dyn IdentityProvider>>,
    codec: Option<Arc<dyn TokenCodec>>,
    clock: Option<Arc<dyn Clock>>,
}

impl AuthContextBuilder {
    pub fn new(storage: Arc<dyn SessionStorage>, settings: AuthSettings) -> Self {
        Self {
            storage,
            settings,
            provider: None,
            codec: None,
            clock: None,
        }
    }

    pub fn with_provider(mut self, provider: Arc<dyn IdentityProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_codec(mut self, codec: Arc<dyn TokenCodec>) -> Self {
        self.codec = Some(codec);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn build(self) -> AuthContext {
        AuthContext {
            inner: Arc::new(AuthContextInner {
                provider: self
                    .provider
                    .unwrap_or_else(|| Arc::new(StaticFixtureProvider::demo())),
                codec: self.codec.unwrap_or_else(|| Arc::new(UnsignedTokenCodec)),
                storage: self.storage,
                clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
                settings: self.settings,
                slot: RwLock::new(SessionSlot::new()),
                login_pending: AtomicBool::new(false),
            }),
        }
    }
}
