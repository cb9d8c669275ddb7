use serde::Serialize;

/// Snapshot of one configured upstream server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpstreamStatus {
    pub pool: String,
    pub address: String,
    pub transport: String,
    pub health_checked: bool,
    pub up: bool,
}

/// Port for querying upstream DNS server health status.
pub trait UpstreamHealthPort: Send + Sync {
    fn upstream_statuses(&self) -> Vec<UpstreamStatus>;
}
