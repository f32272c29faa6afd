use serde::Deserialize;
use thiserror::Error;

use super::principal::Principal;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

#[derive(Deserialize, Clone)]
pub struct AuthSettings {
    #[serde(default = "default_token_ttl")]
    pub token_ttl_minutes: u64,

    /// Artificial latency applied before every login attempt.
    #[serde(default = "default_login_delay")]
    pub login_delay_ms: u64,

    /// Shared secret accepted for every demo principal.
    ///
    /// The `CAMPUS_DEMO_SECRET` environment variable takes priority over this
    /// field.
    #[serde(default = "default_demo_secret")]
    pub demo_secret: Option<String>,

    /// Provision the default administrator when no usable session is found
    /// at startup, instead of staying signed out.
    #[serde(default)]
    pub auto_provision: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory backing the durable session slot.
    #[serde(default = "default_storage_dir")]
    pub dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub auth: AuthSettings,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Replaces the built-in demo principal table when non-empty.
    #[serde(default)]
    pub principals: Vec<Principal>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub const DEMO_SECRET_ENV: &str = "CAMPUS_DEMO_SECRET";

impl AuthSettings {
    pub fn token_ttl_secs(&self) -> i64 {
        i64::try_from(self.token_ttl_minutes.saturating_mul(60)).unwrap_or(i64::MAX)
    }

    pub fn login_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.login_delay_ms)
    }

    /// Resolve the demo secret with `CAMPUS_DEMO_SECRET` taking priority over
    /// the config file field.
    pub fn resolved_demo_secret(&self) -> Option<String> {
        self.resolve_demo_secret_with(|key| std::env::var(key).ok())
    }

    pub fn resolve_demo_secret_with<F>(&self, lookup: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        lookup(DEMO_SECRET_ENV)
            .filter(|s| !s.is_empty())
            .or_else(|| self.demo_secret.clone())
            .filter(|s| !s.is_empty())
    }
}

impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("token_ttl_minutes", &self.token_ttl_minutes)
            .field("login_delay_ms", &self.login_delay_ms)
            .field("demo_secret", &self.demo_secret.as_ref().map(|_| "<redacted>"))
            .field("auto_provision", &self.auto_provision)
            .finish()
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            token_ttl_minutes: default_token_ttl(),
            login_delay_ms: default_login_delay(),
            demo_secret: default_demo_secret(),
            auto_provision: false,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_storage_dir(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Serde defaults
// ---------------------------------------------------------------------------

pub fn default_token_ttl() -> u64 {
    24 * 60
}

pub fn default_login_delay() -> u64 {
    1000
}

pub fn default_demo_secret() -> Option<String> {
    Some("password123".to_string())
}

pub fn default_storage_dir() -> String {
    ".campus-session".to_string()
}

pub fn default_log_level() -> String {
    "info".to_string()
}
