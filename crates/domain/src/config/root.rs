use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::Path;

use super::errors::ConfigError;
use super::health::HealthCheckConfig;
use super::logging::LoggingConfig;
use super::pool::PoolConfig;
use super::route::RouteConfig;
use super::server::ServerConfig;

const DEFAULT_CONFIG_PATHS: &[&str] = &["ferrous-relay.toml", "/etc/ferrous-relay/config.toml"];

/// Main configuration structure for Ferrous Relay
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub pools: Vec<PoolConfig>,

    /// Evaluated in order; the first matching route wins.
    #[serde(default)]
    pub routes: Vec<RouteConfig>,
}

impl Config {
    /// Load configuration from file
    ///
    /// Priority order:
    /// 1. Explicitly provided path (flag or `FERROUS_RELAY_CONFIG`)
    /// 2. ferrous-relay.toml in current directory
    /// 3. /etc/ferrous-relay/config.toml
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path.to_string(),
            None => DEFAULT_CONFIG_PATHS
                .iter()
                .find(|candidate| Path::new(candidate).exists())
                .map(|candidate| candidate.to_string())
                .ok_or_else(|| ConfigError::NotFound(DEFAULT_CONFIG_PATHS.join(", ")))?,
        };

        let mut config = Self::from_file(&path)?;
        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(listen) = overrides.listen_addr {
            self.server.listen_addr = listen;
        }
        if let Some(http) = overrides.http_addr {
            self.server.http_addr = http;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server
            .listen_addr
            .parse::<SocketAddr>()
            .map_err(|e| {
                ConfigError::Validation(format!(
                    "Invalid listen address '{}': {}",
                    self.server.listen_addr, e
                ))
            })?;
        self.server.http_addr.parse::<SocketAddr>().map_err(|e| {
            ConfigError::Validation(format!(
                "Invalid http address '{}': {}",
                self.server.http_addr, e
            ))
        })?;

        if self.pools.is_empty() {
            return Err(ConfigError::Validation("No pools configured".to_string()));
        }
        if self.routes.is_empty() {
            return Err(ConfigError::Validation("No routes configured".to_string()));
        }

        let mut names = HashSet::new();
        for pool in &self.pools {
            if pool.name.is_empty() {
                return Err(ConfigError::Validation(
                    "Pool name cannot be empty".to_string(),
                ));
            }
            if !names.insert(pool.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "Duplicate pool name '{}'",
                    pool.name
                )));
            }
            if pool.servers.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "Pool '{}' has no servers",
                    pool.name
                )));
            }
            for server in &pool.servers {
                server.transport()?;
                server.upstream_addr()?;
                if server.timeout_ms == Some(0) {
                    return Err(ConfigError::Validation(format!(
                        "Server {}: timeout_ms must be at least 1",
                        server.addr
                    )));
                }
                if let Some(check) = pool.effective_health_check(server) {
                    validate_health_check(&server.addr, check)?;
                }
            }
        }

        Ok(())
    }
}

fn validate_health_check(server: &str, check: &HealthCheckConfig) -> Result<(), ConfigError> {
    if check.success_threshold == 0 || check.failure_threshold == 0 {
        return Err(ConfigError::Validation(format!(
            "Server {}: health check thresholds must be at least 1",
            server
        )));
    }
    if check.interval == 0 {
        return Err(ConfigError::Validation(format!(
            "Server {}: health check interval must be at least 1 second",
            server
        )));
    }
    if check.timeout_ms == 0 {
        return Err(ConfigError::Validation(format!(
            "Server {}: health check timeout_ms must be at least 1",
            server
        )));
    }
    Ok(())
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub listen_addr: Option<String>,
    pub http_addr: Option<String>,
    pub log_level: Option<String>,
}
