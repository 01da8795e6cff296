//! Configuration management following 12-factor app principles
//!
//! All configuration is loaded from environment variables to ensure
//! clean separation between code and config.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;

/// Minimum length of a JWT signing secret
pub const MIN_SECRET_LEN: usize = 32;

/// Minimum length of the bootstrap admin password
pub const MIN_ADMIN_PASSWORD_LEN: usize = 8;

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
    Test,
}

impl std::str::FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "development" => Ok(Environment::Development),
            "production" => Ok(Environment::Production),
            "test" => Ok(Environment::Test),
            other => Err(anyhow::anyhow!(
                "APP_ENV must be one of development, production, test (got {})",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub environment: Environment,

    /// PostgreSQL connection URL
    pub database_url: String,

    /// Access token signing secret and lifetime (e.g. `7d`)
    pub jwt_secret: String,
    pub jwt_expires_in: String,

    /// Refresh token signing secret and lifetime (e.g. `30d`)
    pub jwt_refresh_secret: String,
    pub jwt_refresh_expires_in: String,

    /// Allowed CORS origin, `*` for any
    pub cors_origin: String,

    /// Take the client address from `X-Forwarded-For` instead of the socket
    pub trust_proxy: bool,

    /// Admin account created at startup when email and password are both set
    pub admin_email: Option<String>,
    #[serde(skip_serializing)]
    pub admin_password: Option<String>,
    pub admin_name: String,

    /// Runtime configuration
    pub log_level: String,
    pub rust_log: String,
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables
    #[mutants::skip] // Reads the process environment; parsing is covered through from_lookup
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| lookup(key).ok_or_else(|| anyhow::anyhow!("{} is required", key));
        let or_default = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let config = Self {
            environment: or_default("APP_ENV", "development").parse()?,
            database_url: required("DATABASE_URL")?,

            jwt_secret: required("JWT_SECRET")?,
            jwt_expires_in: or_default("JWT_EXPIRES_IN", "7d"),
            jwt_refresh_secret: required("JWT_REFRESH_SECRET")?,
            jwt_refresh_expires_in: or_default("JWT_REFRESH_EXPIRES_IN", "30d"),

            cors_origin: or_default("CORS_ORIGIN", "*"),
            trust_proxy: parse_flag("TRUST_PROXY", &or_default("TRUST_PROXY", "false"))?,

            admin_email: lookup("ADMIN_EMAIL"),
            admin_password: lookup("ADMIN_PASSWORD"),
            admin_name: or_default("ADMIN_NAME", "Administrator"),

            log_level: or_default("LOG_LEVEL", "info"),
            rust_log: or_default("RUST_LOG", "atlas=debug"),
            port: or_default("PORT", "3000")
                .parse()
                .map_err(|e| anyhow::anyhow!("PORT must be a port number: {}", e))?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Check secrets and lifetimes
    pub fn validate(&self) -> Result<()> {
        if self.jwt_secret.len() < MIN_SECRET_LEN {
            anyhow::bail!("JWT_SECRET must be at least {} characters", MIN_SECRET_LEN);
        }
        if self.jwt_refresh_secret.len() < MIN_SECRET_LEN {
            anyhow::bail!(
                "JWT_REFRESH_SECRET must be at least {} characters",
                MIN_SECRET_LEN
            );
        }
        for (key, value) in [
            ("JWT_EXPIRES_IN", &self.jwt_expires_in),
            ("JWT_REFRESH_EXPIRES_IN", &self.jwt_refresh_expires_in),
        ] {
            let lifetime = parse_duration(value)?;
            if chrono::Utc::now().checked_add_signed(lifetime).is_none() {
                anyhow::bail!("{} is too long: {}", key, value);
            }
        }

        match (&self.admin_email, &self.admin_password) {
            (Some(_), Some(password)) if password.len() < MIN_ADMIN_PASSWORD_LEN => {
                anyhow::bail!(
                    "ADMIN_PASSWORD must be at least {} characters",
                    MIN_ADMIN_PASSWORD_LEN
                );
            }
            (Some(_), None) | (None, Some(_)) => {
                anyhow::bail!("ADMIN_EMAIL and ADMIN_PASSWORD must be set together");
            }
            _ => {}
        }
        Ok(())
    }

    /// Rate limiting is switched off in the test environment
    pub fn rate_limiting_enabled(&self) -> bool {
        self.environment != Environment::Test
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        other => Err(anyhow::anyhow!("{} must be true or false (got {})", key, other)),
    }
}

/// Parse a lifetime such as `30s`, `15m`, `12h` or `7d`.
pub fn parse_duration(value: &str) -> Result<chrono::Duration> {
    let value = value.trim();
    let split = value
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(|| anyhow::anyhow!("Duration '{}' is missing a unit", value))?;
    let (amount, unit) = value.split_at(split);

    let amount: i64 = amount
        .parse()
        .map_err(|_| anyhow::anyhow!("Duration '{}' has no amount", value))?;
    if amount <= 0 {
        anyhow::bail!("Duration '{}' must be positive", value);
    }

    let lifetime = match unit {
        "s" => chrono::Duration::try_seconds(amount),
        "m" => chrono::Duration::try_minutes(amount),
        "h" => chrono::Duration::try_hours(amount),
        "d" => chrono::Duration::try_days(amount),
        other => anyhow::bail!("Unknown duration unit '{}'", other),
    };
    lifetime.ok_or_else(|| anyhow::anyhow!("Duration '{}' is out of range", value))
}
