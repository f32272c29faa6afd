use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{debug, error, info};

use crate::types::Role;
use crate::types::app_config::{AppConfig, ConfigError};

pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig, ConfigError> {
    let path = path.as_ref();
    info!("Loading configuration from: {}", path.display());

    let contents = fs::read_to_string(path)?;
    debug!("Processing file: {}", path.display());

    if contents.trim().is_empty() {
        error!("Configuration file is empty");
        return Err(ConfigError::InvalidConfig("empty file".into()));
    }

    let config = parse_config(&contents)?;

    info!("Configuration loaded successfully");
    Ok(config)
}

/// Parse and validate a TOML document.
pub fn parse_config(contents: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = toml::from_str(contents)?;
    debug!("Config: {:?}", config);

    validate_config(&config)?;

    info!("Config validated");
    Ok(config)
}

pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.auth.token_ttl_minutes == 0 {
        return Err(ConfigError::InvalidConfig(
            "token_ttl_minutes must be greater than 0".into(),
        ));
    }

    if config.storage.dir.trim().is_empty() {
        return Err(ConfigError::InvalidConfig(
            "storage.dir cannot be empty".into(),
        ));
    }

    if config.auth.resolved_demo_secret().is_none() {
        return Err(ConfigError::InvalidConfig(
            "demo_secret must be set via the CAMPUS_DEMO_SECRET env var or auth.demo_secret config field"
                .into(),
        ));
    }

    validate_principals(config)
}

fn validate_principals(config: &AppConfig) -> Result<(), ConfigError> {
    // empty table means the built-in fixtures are used
    if config.principals.is_empty() {
        return Ok(());
    }

    let mut ids = HashSet::new();
    let mut emails = HashSet::new();

    for principal in &config.principals {
        if principal.id.trim().is_empty() || principal.email.trim().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "every principal needs a non-empty id and email".into(),
            ));
        }

        if !ids.insert(principal.id.as_str()) {
            return Err(ConfigError::InvalidConfig(format!(
                "duplicate principal id: {}",
                principal.id
            )));
        }

        if !emails.insert(principal.email.trim().to_ascii_lowercase()) {
            return Err(ConfigError::InvalidConfig(format!(
                "duplicate principal email: {}",
                principal.email
            )));
        }
    }

    if config.auth.auto_provision && !config.principals.iter().any(|p| p.role == Role::Admin) {
        return Err(ConfigError::InvalidConfig(
            "auto_provision requires an admin principal".into(),
        ));
    }

    Ok(())
}
