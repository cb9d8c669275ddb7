pub mod errors;
pub mod health;
pub mod logging;
pub mod pool;
pub mod root;
pub mod route;
pub mod server;

pub use errors::ConfigError;
pub use health::HealthCheckConfig;
pub use logging::{LogFormat, LoggingConfig};
pub use pool::{PoolConfig, UpstreamServerConfig};
pub use root::{CliOverrides, Config};
pub use route::{RouteConfig, RouteMatch, RouteTarget};
pub use server::{ListenMode, ServerConfig};
