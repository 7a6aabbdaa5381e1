// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values and the
//! [`GatewayConfig`] assembled from them. Configuration is loaded once at
//! startup and is immutable for the lifetime of the process; rotating a
//! token secret requires a restart.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `ENVIRONMENT` | Deployment mode (`development`, `qa`, `production`) | `development` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `9000` |
//! | `JWT_SECRET` | Access-token signing secret | Required |
//! | `JWT_REFRESH_SECRET` | Refresh-token signing secret | Required |
//! | `ACCESS_TOKEN_TTL_SECS` | Access-token lifetime | `900` |
//! | `REFRESH_TOKEN_TTL_SECS` | Refresh-token lifetime | `604800` |
//! | `COOKIE_DOMAIN` | Parent domain for session cookies (ignored in development) | unset |
//! | `CORS_ORIGIN` | Allowed browser origin | per mode |
//! | `DOWNSTREAM_SERVICES` | `name=url,...` downstream table | per mode |
//! | `DOWNSTREAM_TIMEOUT_SECS` | Deadline for a forwarded request | `30` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;
use std::time::Duration;

use crate::auth::cookies::CookieSettings;
use crate::auth::tokens::{TokenLifetimes, TokenSecrets};
use crate::downstream::ServiceRegistry;

pub const ENVIRONMENT_ENV: &str = "ENVIRONMENT";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";
pub const JWT_REFRESH_SECRET_ENV: &str = "JWT_REFRESH_SECRET";
pub const ACCESS_TOKEN_TTL_ENV: &str = "ACCESS_TOKEN_TTL_SECS";
pub const REFRESH_TOKEN_TTL_ENV: &str = "REFRESH_TOKEN_TTL_SECS";
pub const COOKIE_DOMAIN_ENV: &str = "COOKIE_DOMAIN";
pub const CORS_ORIGIN_ENV: &str = "CORS_ORIGIN";
pub const DOWNSTREAM_SERVICES_ENV: &str = "DOWNSTREAM_SERVICES";
pub const DOWNSTREAM_TIMEOUT_ENV: &str = "DOWNSTREAM_TIMEOUT_SECS";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Optional principal seeded into the in-memory store at startup.
pub const SEED_PRINCIPAL_EMAIL_ENV: &str = "SEED_PRINCIPAL_EMAIL";
pub const SEED_PRINCIPAL_PASSWORD_ENV: &str = "SEED_PRINCIPAL_PASSWORD";
pub const SEED_PRINCIPAL_KIND_ENV: &str = "SEED_PRINCIPAL_KIND";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 9000;
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";
pub const DEFAULT_DOWNSTREAM_TIMEOUT: Duration = Duration::from_secs(30);
/// Upper bound for token lifetimes (ten years).
pub const MAX_TOKEN_TTL_SECS: i64 = 10 * 365 * 24 * 60 * 60;

/// Deployment mode selected by `ENVIRONMENT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeploymentMode {
    #[default]
    Development,
    Qa,
    Production,
}

impl DeploymentMode {
    /// Parse the mode. Unrecognized or missing values fall back to development.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("production") => DeploymentMode::Production,
            Some("qa") => DeploymentMode::Qa,
            _ => DeploymentMode::Development,
        }
    }

    pub fn is_development(&self) -> bool {
        *self == DeploymentMode::Development
    }

    /// Browser origin allowed to call the gateway with credentials.
    pub fn default_cors_origin(&self) -> &'static str {
        match self {
            DeploymentMode::Development => "http://localhost:3000",
            DeploymentMode::Qa => "https://qa.app.ekoru.cl",
            DeploymentMode::Production => "https://app.ekoru.cl",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentMode::Development => "development",
            DeploymentMode::Qa => "qa",
            DeploymentMode::Production => "production",
        }
    }
}

impl std::fmt::Display for DeploymentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error("{JWT_SECRET_ENV} and {JWT_REFRESH_SECRET_ENV} must be different secrets")]
    SharedSecret,
}

/// Fully resolved gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub mode: DeploymentMode,
    pub bind_addr: SocketAddr,
    pub secrets: TokenSecrets,
    pub lifetimes: TokenLifetimes,
    pub cookies: CookieSettings,
    pub cors_origin: String,
    pub services: ServiceRegistry,
    pub downstream_timeout: Duration,
    pub log_format: LogFormat,
}

impl GatewayConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values are treated the same as unset ones.
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mode = DeploymentMode::parse(get(ENVIRONMENT_ENV).as_deref());

        let host = get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match get(PORT_ENV) {
            Some(raw) => parse_number::<u16>(PORT_ENV, &raw)?,
            None => DEFAULT_PORT,
        };
        let bind_addr: SocketAddr =
            format!("{host}:{port}")
                .parse()
                .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                    var: HOST_ENV,
                    reason: e.to_string(),
                })?;

        let access_secret = get(JWT_SECRET_ENV).ok_or(ConfigError::Missing(JWT_SECRET_ENV))?;
        let refresh_secret =
            get(JWT_REFRESH_SECRET_ENV).ok_or(ConfigError::Missing(JWT_REFRESH_SECRET_ENV))?;
        let secrets = TokenSecrets::new(access_secret, refresh_secret)?;

        let mut lifetimes = TokenLifetimes::default();
        if let Some(raw) = get(ACCESS_TOKEN_TTL_ENV) {
            lifetimes.access = token_ttl(ACCESS_TOKEN_TTL_ENV, &raw)?;
        }
        if let Some(raw) = get(REFRESH_TOKEN_TTL_ENV) {
            lifetimes.refresh = token_ttl(REFRESH_TOKEN_TTL_ENV, &raw)?;
        }

        let cookies = CookieSettings::for_mode(mode, get(COOKIE_DOMAIN_ENV));
        let cors_origin =
            get(CORS_ORIGIN_ENV).unwrap_or_else(|| mode.default_cors_origin().to_string());

        let services = match get(DOWNSTREAM_SERVICES_ENV) {
            Some(raw) => ServiceRegistry::parse(&raw).map_err(|reason| ConfigError::Invalid {
                var: DOWNSTREAM_SERVICES_ENV,
                reason,
            })?,
            None => ServiceRegistry::defaults_for(mode),
        };

        let downstream_timeout = match get(DOWNSTREAM_TIMEOUT_ENV) {
            Some(raw) => Duration::from_secs(positive(DOWNSTREAM_TIMEOUT_ENV, &raw)? as u64),
            None => DEFAULT_DOWNSTREAM_TIMEOUT,
        };

        Ok(Self {
            mode,
            bind_addr,
            secrets,
            lifetimes,
            cookies,
            cors_origin,
            services,
            downstream_timeout,
            log_format: LogFormat::parse(get(LOG_FORMAT_ENV).as_deref()),
        })
    }
}

fn parse_number<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
        var,
        reason: e.to_string(),
    })
}

fn positive(var: &'static str, raw: &str) -> Result<i64, ConfigError> {
    let value = parse_number::<i64>(var, raw)?;
    if value <= 0 {
        return Err(ConfigError::Invalid {
            var,
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(value)
}

fn token_ttl(var: &'static str, raw: &str) -> Result<chrono::Duration, ConfigError> {
    let secs = positive(var, raw)?;
    if secs > MAX_TOKEN_TTL_SECS {
        return Err(ConfigError::Invalid {
            var,
            reason: format!("must be at most {MAX_TOKEN_TTL_SECS} seconds"),
        });
    }
    chrono::Duration::try_seconds(secs).ok_or(ConfigError::Invalid {
        var,
        reason: "out of range".to_string(),
    })
}
