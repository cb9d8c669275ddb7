mod metrics_exporter;
mod query_handler;
mod response_sink;
mod upstream_exchange;
mod upstream_health_port;

pub use metrics_exporter::MetricsExporter;
pub use query_handler::QueryHandler;
pub use response_sink::ResponseSink;
pub use upstream_exchange::UpstreamExchange;
pub use upstream_health_port::{UpstreamHealthPort, UpstreamStatus};
