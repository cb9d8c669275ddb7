pub mod health;
pub mod metrics;
pub mod upstreams;

pub use health::health_check;
pub use metrics::get_metrics;
pub use upstreams::get_upstreams;
