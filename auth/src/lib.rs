//! Session and role-based authorization for the campus dashboard.
//!
//! [`AuthContext`] owns "who is signed in" and answers "what may they do".
//! Its collaborators sit behind traits so each can be replaced on its own:
//!
//! | Seam | Trait | Shipped implementation |
//! |------|-------|------------------------|
//! | Who exists, which secret is right | [`IdentityProvider`] | [`StaticFixtureProvider`] |
//! | Bearer token format | [`TokenCodec`] | [`UnsignedTokenCodec`] |
//! | Durable key-value slot | [`SessionStorage`] | [`MemoryStorage`], [`FileStorage`] |
//! | Wall clock | [`Clock`] | [`SystemClock`], [`ManualClock`] |

pub mod clock;
pub mod context;
pub mod identity;
pub mod storage;
pub mod token;

pub use clock::{Clock, ManualClock, SystemClock};
pub use context::{AuthContext, AuthContextBuilder, SessionSnapshot, SessionState};
pub use identity::{IdentityProvider, StaticFixtureProvider};
pub use storage::{FileStorage, MemoryStorage, SessionStorage};
pub use token::{TokenCodec, UnsignedTokenCodec};

pub use campus_shared::types::{
    AuthError, AuthSettings, PermissionSet, Principal, PrincipalPatch, Role,
};
