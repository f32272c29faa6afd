pub mod app_config;
pub mod login;
pub mod permission;
pub mod principal;
pub mod role;
pub mod session;
pub mod token;

pub use self::app_config::{AppConfig, AuthSettings, ConfigError, LoggingConfig, StorageConfig};
pub use self::login::{AuthError, LoginRequest, LoginResponse, SessionResponse};
pub use self::permission::{PermissionSet, WILDCARD, capability};
pub use self::principal::{Principal, PrincipalPatch};
pub use self::role::{ParseRoleError, Role};
pub use self::session::{SessionRecord, StorageError, keys};
pub use self::token::{TokenClaims, TokenError};
