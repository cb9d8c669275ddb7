//! Ferrous Relay Domain Layer
pub mod config;
pub mod dns_request;
pub mod errors;
pub mod transport_mode;
pub mod upstream_addr;

pub use config::{
    CliOverrides, Config, ConfigError, HealthCheckConfig, ListenMode, LogFormat, LoggingConfig,
    PoolConfig, RouteConfig, RouteMatch, RouteTarget, ServerConfig, UpstreamServerConfig,
};
pub use dns_request::DnsRequest;
pub use errors::DomainError;
pub use transport_mode::TransportMode;
pub use upstream_addr::{UpstreamAddr, DEFAULT_DNS_PORT};
