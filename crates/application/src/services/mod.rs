mod dns_response;
mod downstream_pool;
mod drop_handler;
mod health_monitor;
mod health_state;
mod route_table;
mod upstream_status;

pub use dns_response::{error_response, send_error};
pub use downstream_pool::{DownstreamPool, PoolMember};
pub use drop_handler::DropHandler;
pub use health_monitor::HealthMonitor;
pub use health_state::{HealthState, HealthTransition};
pub use route_table::{RouteMatcher, RouteTable};
pub use upstream_status::UpstreamStatusRegistry;
