use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::errors::ConfigError;
use super::health::HealthCheckConfig;
use crate::{TransportMode, UpstreamAddr};

const DEFAULT_EXCHANGE_TIMEOUT_MS: u64 = 2000;

/// Ordered list of upstream servers tried in sequence for a routed query.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PoolConfig {
    pub name: String,

    /// Default probe settings for servers that omit their own.
    #[serde(default)]
    pub health_check: Option<HealthCheckConfig>,

    #[serde(default)]
    pub servers: Vec<UpstreamServerConfig>,
}

impl PoolConfig {
    /// Probe settings for `server`, falling back to the pool-level default.
    /// `None` means the server is never health checked and is always tried.
    pub fn effective_health_check<'a>(
        &'a self,
        server: &'a UpstreamServerConfig,
    ) -> Option<&'a HealthCheckConfig> {
        server.health_check.as_ref().or(self.health_check.as_ref())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamServerConfig {
    pub addr: String,

    #[serde(default)]
    pub net: String,

    #[serde(default)]
    pub timeout_ms: Option<u64>,

    /// SNI override for `tcp-tls`; defaults to the host part of `addr`.
    #[serde(default)]
    pub tls_name: Option<String>,

    #[serde(default)]
    pub health_check: Option<HealthCheckConfig>,
}

impl UpstreamServerConfig {
    pub fn transport(&self) -> Result<TransportMode, ConfigError> {
        self.net
            .parse()
            .map_err(|reason| ConfigError::InvalidTransport {
                server: self.addr.clone(),
                reason,
            })
    }

    pub fn upstream_addr(&self) -> Result<UpstreamAddr, ConfigError> {
        self.addr
            .parse()
            .map_err(|reason| ConfigError::InvalidUpstreamAddr {
                server: self.addr.clone(),
                reason,
            })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.unwrap_or(DEFAULT_EXCHANGE_TIMEOUT_MS))
    }

    pub fn server_name(&self) -> String {
        match self.tls_name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self
                .upstream_addr()
                .map(|addr| addr.host().to_string())
                .unwrap_or_else(|_| self.addr.clone()),
        }
    }
}
