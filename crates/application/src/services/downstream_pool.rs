use async_trait::async_trait;
use hickory_proto::op::{Message, ResponseCode};
use std::sync::Arc;
use tracing::{debug, error, warn};

use super::dns_response::send_error;
use super::health_state::HealthState;
use crate::ports::{QueryHandler, ResponseSink, UpstreamExchange};

/// One pool slot: the exchange plus its health cell, if it is monitored.
#[derive(Clone)]
pub struct PoolMember {
    pub upstream: Arc<dyn UpstreamExchange>,
    pub health: Option<Arc<HealthState>>,
}

impl PoolMember {
    pub fn new(upstream: Arc<dyn UpstreamExchange>, health: Option<Arc<HealthState>>) -> Self {
        Self { upstream, health }
    }

    /// Unmonitored members are always eligible.
    #[inline]
    pub fn is_eligible(&self) -> bool {
        self.health.as_ref().map_or(true, |h| h.is_up())
    }
}

/// Ordered failover across upstreams. Order is preference, not weight.
pub struct DownstreamPool {
    name: String,
    members: Vec<PoolMember>,
}

impl DownstreamPool {
    pub fn new(name: impl Into<String>, members: Vec<PoolMember>) -> Self {
        Self {
            name: name.into(),
            members,
        }
    }

    pub fn members(&self) -> &[PoolMember] {
        &self.members
    }
}

#[async_trait]
impl QueryHandler for DownstreamPool {
    async fn handle(&self, query: &Message, sink: &mut dyn ResponseSink) {
        for (position, member) in self.members.iter().enumerate() {
            let upstream = member.upstream.name();
            if !member.is_eligible() {
                debug!(pool = %self.name, upstream = %upstream, position, "Skipping DOWN upstream");
                continue;
            }

            match member.upstream.send(query).await {
                Ok(response) => {
                    if let Err(e) = sink.write(response).await {
                        warn!(pool = %self.name, upstream = %upstream, error = %e, "Failed to write response");
                    }
                    return;
                }
                Err(e) => {
                    error!(pool = %self.name, upstream = %upstream, error = %e, position, "Upstream exchange failed, failing over");
                }
            }
        }

        error!(pool = %self.name, "All upstreams failed or down");
        send_error(sink, query, ResponseCode::ServFail).await;
    }

    fn name(&self) -> &str {
        &self.name
    }
}
