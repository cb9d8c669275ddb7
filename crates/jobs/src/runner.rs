use crate::HealthCheckJob;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub trait SpawnableJob: Send + Sync + 'static {
    fn with_cancellation(self, token: CancellationToken) -> Self;
    fn start_job(self: Arc<Self>) -> JoinHandle<()>;
}

impl SpawnableJob for HealthCheckJob {
    fn with_cancellation(self, token: CancellationToken) -> Self {
        self.with_cancellation(token)
    }

    fn start_job(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move { self.start().await })
    }
}

fn spawn_job<J: SpawnableJob>(job: J, shutdown: &Option<CancellationToken>) -> JoinHandle<()> {
    let job = match shutdown {
        Some(token) => job.with_cancellation(token.clone()),
        None => job,
    };
    Arc::new(job).start_job()
}

pub struct JobRunner {
    health_checks: Vec<HealthCheckJob>,
    shutdown: Option<CancellationToken>,
}

impl JobRunner {
    pub fn new() -> Self {
        Self {
            health_checks: Vec::new(),
            shutdown: None,
        }
    }

    pub fn with_health_check(mut self, job: HealthCheckJob) -> Self {
        self.health_checks.push(job);
        self
    }

    pub fn with_shutdown_token(mut self, token: CancellationToken) -> Self {
        self.shutdown = Some(token);
        self
    }

    /// Spawn every job; the handles finish once the shutdown token fires.
    pub fn start(self) -> Vec<JoinHandle<()>> {
        info!(health_checks = self.health_checks.len(), "Starting background job runner");

        let handles: Vec<_> = self
            .health_checks
            .into_iter()
            .map(|job| spawn_job(job, &self.shutdown))
            .collect();

        info!("All background jobs started");
        handles
    }
}

impl Default for JobRunner {
    fn default() -> Self {
        Self::new()
    }
}
