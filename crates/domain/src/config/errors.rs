#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    FileRead(String, String),

    #[error("No configuration file found (tried {0})")]
    NotFound(String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Configuration validation error: {0}")]
    Validation(String),

    #[error("Server {server}: invalid net: {reason}")]
    InvalidTransport { server: String, reason: String },

    #[error("Server {server}: invalid address: {reason}")]
    InvalidUpstreamAddr { server: String, reason: String },

    #[error("Route {index} must define either an address or a domain")]
    RouteMissingMatch { index: usize },

    #[error("Route {index} defines both an address and a domain")]
    RouteAmbiguousMatch { index: usize },

    #[error("Route {index} defines an invalid address cidr '{value}': {reason}")]
    InvalidCidr {
        index: usize,
        value: String,
        reason: String,
    },

    #[error("Route {index} references unknown pool '{pool}'")]
    UnknownPool { index: usize, pool: String },

    #[error("Route {index} must either drop or forward to a pool")]
    RouteMissingTarget { index: usize },
}
