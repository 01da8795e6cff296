//! Token configuration

use atlas_common::config::{parse_duration, Config};
use chrono::Duration;

/// Secret and lifetime for one kind of token
#[derive(Debug, Clone)]
pub struct TokenSettings {
    pub secret: String,
    pub lifetime: Duration,
    /// Lifetime as configured, e.g. `7d`
    pub expires_in: String,
}

impl TokenSettings {
    pub fn new(secret: impl Into<String>, expires_in: &str) -> anyhow::Result<Self> {
        Ok(Self {
            secret: secret.into(),
            lifetime: parse_duration(expires_in)?,
            expires_in: expires_in.to_string(),
        })
    }
}

/// Access and refresh token settings
#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub access: TokenSettings,
    pub refresh: TokenSettings,
}

impl TokenConfig {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            access: TokenSettings::new(config.jwt_secret.clone(), &config.jwt_expires_in)?,
            refresh: TokenSettings::new(
                config.jwt_refresh_secret.clone(),
                &config.jwt_refresh_expires_in,
            )?,
        })
    }
}
