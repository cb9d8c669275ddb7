use ferrous_relay_domain::{ConfigError, DomainError, HealthCheckConfig};
use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::{DNSClass, Name, RecordType};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::health_state::{HealthState, HealthTransition};
use crate::ports::UpstreamExchange;

/// Probes one upstream through its regular send path and feeds the outcome
/// into the shared [`HealthState`] the pool reads.
pub struct HealthMonitor {
    exchange: Arc<dyn UpstreamExchange>,
    state: Arc<HealthState>,
    check_name: Name,
    timeout: Duration,
    interval: Duration,
}

impl HealthMonitor {
    pub fn new(
        exchange: Arc<dyn UpstreamExchange>,
        config: &HealthCheckConfig,
    ) -> Result<Self, ConfigError> {
        let check_name = Name::from_str(&config.check_name).map_err(|e| {
            ConfigError::Validation(format!(
                "Invalid health check name '{}': {}",
                config.check_name, e
            ))
        })?;

        Ok(Self {
            exchange,
            state: Arc::new(HealthState::new(
                config.success_threshold,
                config.failure_threshold,
            )),
            check_name,
            timeout: config.timeout(),
            interval: config.interval(),
        })
    }

    pub fn state(&self) -> Arc<HealthState> {
        Arc::clone(&self.state)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn upstream(&self) -> &str {
        self.exchange.name()
    }

    /// One synthetic A query, bounded by the probe timeout. Any well-formed
    /// response counts as success regardless of its rcode.
    pub async fn probe(&self) -> Result<(), DomainError> {
        let mut query = Query::new();
        query.set_name(self.check_name.clone());
        query.set_query_type(RecordType::A);
        query.set_query_class(DNSClass::IN);

        let mut message = Message::new(fastrand::u16(..), MessageType::Query, OpCode::Query);
        message.metadata.recursion_desired = true;
        message.add_query(query);

        match tokio::time::timeout(self.timeout, self.exchange.send(&message)).await {
            Ok(result) => result.map(|_| ()),
            Err(_) => Err(DomainError::TransportTimeout {
                server: self.exchange.name().to_string(),
            }),
        }
    }

    /// Probe once and apply the outcome to the state machine.
    pub async fn check(&self) -> Option<HealthTransition> {
        let upstream = self.exchange.name();
        let transition = match self.probe().await {
            Ok(()) => {
                debug!(upstream = %upstream, "Health probe succeeded");
                self.state.record_success()
            }
            Err(e) => {
                info!(upstream = %upstream, error = %e, "Health probe failed");
                self.state.record_failure()
            }
        };

        match transition {
            Some(HealthTransition::Down {
                consecutive_failures,
            }) => {
                warn!(
                    upstream = %upstream,
                    failures = consecutive_failures,
                    "Upstream marked DOWN"
                );
            }
            Some(HealthTransition::Up {
                consecutive_successes,
            }) => {
                info!(
                    upstream = %upstream,
                    successes = consecutive_successes,
                    "Upstream marked UP"
                );
            }
            None => {}
        }
        transition
    }
}
