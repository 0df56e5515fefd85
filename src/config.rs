//! Configuration management for Circulate
//!
//! Parses TOML configuration files and provides typed access to settings.
//! Every section has defaults, so an empty file (or no file at all) yields a
//! runnable configuration with the built-in five-endpoint pool.

use crate::error::{AppError, AppResult};
use crate::selector::{EndpointId, Policy};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;

/// Endpoints the pool starts with when none are configured
pub const DEFAULT_ENDPOINTS: [&str; 5] = [
    "95.77.48.211",
    "109.170.148.204",
    "76.223.137.165",
    "122.117.19.28",
    "45.223.197.37",
];

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub pool: PoolConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

impl ServerConfig {
    /// Socket address to bind
    ///
    /// Falls back to `0.0.0.0` if `host` is not a valid IP address.
    pub fn socket_addr(&self) -> SocketAddr {
        let ip = self.host.parse::<IpAddr>().unwrap_or_else(|_| {
            tracing::warn!(
                host = %self.host,
                "server.host is not an IP address, binding to 0.0.0.0"
            );
            IpAddr::from([0, 0, 0, 0])
        });
        SocketAddr::from((ip, self.port))
    }
}

/// Initial endpoint pool and selection policy
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PoolConfig {
    #[serde(default = "default_endpoints")]
    pub endpoints: Vec<String>,
    /// Policy active at startup; unknown names are rejected by serde
    #[serde(default)]
    pub policy: Policy,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            endpoints: default_endpoints(),
            policy: Policy::default(),
        }
    }
}

fn default_endpoints() -> Vec<String> {
    DEFAULT_ENDPOINTS.iter().map(|s| s.to_string()).collect()
}

impl PoolConfig {
    /// Validated endpoint identifiers in configured order
    pub fn endpoint_ids(&self) -> AppResult<Vec<EndpointId>> {
        self.endpoints
            .iter()
            .map(|raw| {
                EndpointId::parse(raw.as_str()).map_err(|_| {
                    AppError::Config(format!(
                        "pool.endpoints contains a blank identifier ({:?})",
                        raw
                    ))
                })
            })
            .collect()
    }
}

/// Observability configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let path_display = path.as_ref().display().to_string();

        let content =
            std::fs::read_to_string(path.as_ref()).map_err(|source| AppError::ConfigFileRead {
                path: path_display.clone(),
                source,
            })?;

        let config: Self = toml::from_str(&content).map_err(|source| AppError::ConfigParseFailed {
            path: path_display.clone(),
            source,
        })?;

        config
            .validate()
            .map_err(|e| AppError::ConfigValidationFailed {
                path: path_display,
                reason: e.to_string(),
            })?;

        Ok(config)
    }

    /// Validate configuration after parsing
    ///
    /// Called by `from_file()`; call it explicitly when building a Config
    /// by other means.
    pub fn validate(&self) -> AppResult<()> {
        if self.server.port == 0 {
            return Err(AppError::Config(
                "server.port must be greater than 0".to_string(),
            ));
        }

        if self.pool.endpoints.is_empty() {
            return Err(AppError::Config(
                "pool.endpoints has no entries. At least one endpoint is required \
                because selection cannot succeed on an empty pool.\n\n\
                Example fix - add to config.toml:\n\
                [pool]\n\
                endpoints = [\"10.0.0.1\", \"10.0.0.2\"]"
                    .to_string(),
            ));
        }

        let ids = self.pool.endpoint_ids()?;

        let mut seen = HashSet::new();
        for id in &ids {
            if !seen.insert(id) {
                return Err(AppError::Config(format!(
                    "pool.endpoints lists '{}' more than once",
                    id
                )));
            }
        }

        Ok(())
    }
}
