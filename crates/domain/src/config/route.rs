use ipnetwork::IpNetwork;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

use super::errors::ConfigError;

/// One `[[routes]]` entry. Exactly one of `addr` or `domain` selects the
/// queries it applies to; `drop` or `pool` says what happens to them.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RouteConfig {
    #[serde(default)]
    pub addr: Option<String>,

    #[serde(default)]
    pub domain: Option<String>,

    #[serde(default)]
    pub pool: Option<String>,

    #[serde(default)]
    pub drop: bool,

    /// Require the suffix to start on a label boundary ("example.com" no
    /// longer matches "badexample.com").
    #[serde(default)]
    pub label_boundary: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteMatch {
    Prefix(IpNetwork),
    Suffix { suffix: String, label_boundary: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteTarget {
    Drop,
    Pool(String),
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl RouteConfig {
    pub fn match_key(&self, index: usize) -> Result<RouteMatch, ConfigError> {
        match (non_empty(&self.addr), non_empty(&self.domain)) {
            (Some(_), Some(_)) => Err(ConfigError::RouteAmbiguousMatch { index }),
            (None, None) => Err(ConfigError::RouteMissingMatch { index }),
            (Some(addr), None) => parse_prefix(addr)
                .map(RouteMatch::Prefix)
                .map_err(|reason| ConfigError::InvalidCidr {
                    index,
                    value: addr.to_string(),
                    reason,
                }),
            (None, Some(domain)) => Ok(RouteMatch::Suffix {
                suffix: domain.to_string(),
                label_boundary: self.label_boundary,
            }),
        }
    }

    /// `drop` wins when a route also names a pool.
    pub fn target(&self, index: usize) -> Result<RouteTarget, ConfigError> {
        if self.drop {
            return Ok(RouteTarget::Drop);
        }
        non_empty(&self.pool)
            .map(|pool| RouteTarget::Pool(pool.to_string()))
            .ok_or(ConfigError::RouteMissingTarget { index })
    }
}

/// A bare address is taken as a full-length prefix.
fn parse_prefix(value: &str) -> Result<IpNetwork, String> {
    if value.contains('/') {
        return value.parse::<IpNetwork>().map_err(|e| e.to_string());
    }
    value
        .parse::<IpAddr>()
        .map(IpNetwork::from)
        .map_err(|e| e.to_string())
}
