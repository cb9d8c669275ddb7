use ferrous_relay_application::services::HealthMonitor;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Periodic probe loop for one upstream. The first probe fires one full
/// interval after start; a slow probe pushes the next tick back rather
/// than bunching ticks up.
pub struct HealthCheckJob {
    monitor: Arc<HealthMonitor>,
    interval: Duration,
    shutdown: CancellationToken,
}

impl HealthCheckJob {
    pub fn new(monitor: Arc<HealthMonitor>) -> Self {
        Self {
            interval: monitor.interval(),
            monitor,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub async fn start(self: Arc<Self>) {
        let upstream = self.monitor.upstream().to_string();
        info!(upstream = %upstream, interval_secs = self.interval.as_secs_f64(), "Starting health check job");

        let mut interval = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = interval.tick() => {
                    tokio::select! {
                        _ = self.shutdown.cancelled() => break,
                        _ = self.monitor.check() => {}
                    }
                }
            }
        }

        debug!(upstream = %upstream, "HealthCheckJob: shutting down");
    }
}
