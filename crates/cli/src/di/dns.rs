use ferrous_relay_application::ports::QueryHandler;
use ferrous_relay_application::services::{
    DownstreamPool, HealthMonitor, PoolMember, RouteTable, UpstreamStatusRegistry,
};
use ferrous_relay_application::use_cases::DispatchQueryUseCase;
use ferrous_relay_domain::{Config, PoolConfig};
use ferrous_relay_infrastructure::dns::client::{UpstreamClient, UpstreamEndpoint};
use ferrous_relay_infrastructure::metrics::RelayMetrics;
use ferrous_relay_jobs::HealthCheckJob;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub struct DnsServices {
    pub dispatcher: Arc<DispatchQueryUseCase>,
    pub metrics: Arc<RelayMetrics>,
    pub upstream_status: Arc<UpstreamStatusRegistry>,
    pub health_checks: Vec<HealthCheckJob>,
    pub clients: Vec<Arc<UpstreamClient>>,
}

impl DnsServices {
    /// Dials every upstream before returning; any dial failure aborts startup.
    pub async fn new(config: &Config, shutdown: &CancellationToken) -> anyhow::Result<Self> {
        info!(pools = config.pools.len(), "Initializing DNS services");

        let metrics = Arc::new(RelayMetrics::new()?);
        let mut upstream_status = UpstreamStatusRegistry::new();
        let mut health_checks = Vec::new();
        let mut clients = Vec::new();
        let mut pools: HashMap<String, Arc<dyn QueryHandler>> = HashMap::new();

        for pool_config in &config.pools {
            let members = Self::build_pool_members(
                pool_config,
                &metrics,
                shutdown,
                &mut upstream_status,
                &mut health_checks,
                &mut clients,
            )
            .await?;

            info!(pool = %pool_config.name, servers = members.len(), "Pool ready");
            pools.insert(
                pool_config.name.clone(),
                Arc::new(DownstreamPool::new(pool_config.name.clone(), members)),
            );
        }

        let routes = RouteTable::build(&config.routes, &pools)?;
        info!(routes = config.routes.len(), "Route table built");

        Ok(Self {
            dispatcher: Arc::new(DispatchQueryUseCase::new(Arc::new(routes))),
            metrics,
            upstream_status: Arc::new(upstream_status),
            health_checks,
            clients,
        })
    }

    async fn build_pool_members(
        pool_config: &PoolConfig,
        metrics: &Arc<RelayMetrics>,
        shutdown: &CancellationToken,
        upstream_status: &mut UpstreamStatusRegistry,
        health_checks: &mut Vec<HealthCheckJob>,
        clients: &mut Vec<Arc<UpstreamClient>>,
    ) -> anyhow::Result<Vec<PoolMember>> {
        let mut members = Vec::with_capacity(pool_config.servers.len());

        for server in &pool_config.servers {
            let endpoint = UpstreamEndpoint::from_config(&pool_config.name, server)?;
            let client = Arc::new(
                UpstreamClient::connect(endpoint, metrics.clone(), shutdown)
                    .await
                    .map_err(|e| {
                        anyhow::anyhow!(
                            "failed to connect to upstream {} in pool '{}': {}",
                            server.addr,
                            pool_config.name,
                            e
                        )
                    })?,
            );

            let health = match pool_config.effective_health_check(server) {
                Some(check) => {
                    let monitor = Arc::new(HealthMonitor::new(client.clone(), check)?);
                    let state = monitor.state();
                    health_checks.push(HealthCheckJob::new(monitor));
                    Some(state)
                }
                None => None,
            };

            upstream_status.register(
                pool_config.name.as_str(),
                server.addr.as_str(),
                client.endpoint().mode.as_str(),
                health.clone(),
            );
            members.push(PoolMember::new(client.clone(), health));
            clients.push(client);
        }

        Ok(members)
    }
}
