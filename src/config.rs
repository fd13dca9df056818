/*
 * Responsibility
 * - Load settings from environment variables (SECRET, AUTHZ_ISS, DEBUG, ...)
 * - Validate them once at startup (missing/invalid values abort the process)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use crate::services::auth::policy::DEFAULT_MIN_CLAIM_LENGTH;
use crate::services::auth::{PolicyDescriptor, VerificationSecret};

pub const DEFAULT_ISSUER: &str = "test-issuer";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(value: Option<String>) -> Self {
        match value
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    // DEBUG > 0 turns on debug-level logging
    pub debug: bool,

    pub verification_secret: VerificationSecret,
    pub expected_issuer: String,
    pub min_sub_length: usize,
    pub min_jti_length: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (environment, map in tests, ...).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = match lookup("PORT") {
            Some(s) => s.trim().parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(lookup("APP_ENV"));

        // Same semantics as the gateway deployment: integer, > 0 means on.
        let debug = lookup("DEBUG")
            .and_then(|v| v.trim().parse::<i64>().ok())
            .is_some_and(|v| v > 0);

        let verification_secret =
            VerificationSecret::new(lookup("SECRET").ok_or(ConfigError::Missing("SECRET"))?);
        if verification_secret.is_empty() {
            return Err(ConfigError::Invalid("SECRET"));
        }

        let expected_issuer = lookup("AUTHZ_ISS").unwrap_or_else(|| DEFAULT_ISSUER.to_string());
        if expected_issuer.is_empty() {
            return Err(ConfigError::Invalid("AUTHZ_ISS"));
        }

        let min_sub_length = parse_length(&lookup, "AUTHZ_MIN_SUB_LENGTH")?;
        let min_jti_length = parse_length(&lookup, "AUTHZ_MIN_JTI_LENGTH")?;

        Ok(Self {
            addr,
            app_env,
            debug,
            verification_secret,
            expected_issuer,
            min_sub_length,
            min_jti_length,
        })
    }

    pub fn policy(&self) -> PolicyDescriptor {
        PolicyDescriptor::new(self.expected_issuer.clone())
            .with_min_sub_length(self.min_sub_length)
            .with_min_jti_length(self.min_jti_length)
    }
}

fn parse_length<F>(lookup: &F, key: &'static str) -> Result<usize, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(DEFAULT_MIN_CLAIM_LENGTH),
    }
}
