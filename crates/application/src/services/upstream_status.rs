use std::sync::Arc;

use super::health_state::HealthState;
use crate::ports::{UpstreamHealthPort, UpstreamStatus};

struct Entry {
    pool: String,
    address: String,
    transport: String,
    health: Option<Arc<HealthState>>,
}

/// Read-only view over the same health cells the pools consult, in
/// pool/server configuration order.
#[derive(Default)]
pub struct UpstreamStatusRegistry {
    entries: Vec<Entry>,
}

impl UpstreamStatusRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        pool: impl Into<String>,
        address: impl Into<String>,
        transport: impl Into<String>,
        health: Option<Arc<HealthState>>,
    ) {
        self.entries.push(Entry {
            pool: pool.into(),
            address: address.into(),
            transport: transport.into(),
            health,
        });
    }
}

impl UpstreamHealthPort for UpstreamStatusRegistry {
    fn upstream_statuses(&self) -> Vec<UpstreamStatus> {
        self.entries
            .iter()
            .map(|entry| UpstreamStatus {
                pool: entry.pool.clone(),
                address: entry.address.clone(),
                transport: entry.transport.clone(),
                health_checked: entry.health.is_some(),
                up: entry.health.as_ref().map_or(true, |h| h.is_up()),
            })
            .collect()
    }
}
