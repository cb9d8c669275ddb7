use async_trait::async_trait;
use ferrous_relay_application::ports::UpstreamExchange;
use ferrous_relay_domain::{
    ConfigError, DomainError, TransportMode, UpstreamAddr, UpstreamServerConfig,
};
use hickory_proto::op::Message;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::codec;
use super::transport::Transport;
use crate::metrics::RelayMetrics;

/// Everything needed to dial one configured upstream.
#[derive(Debug, Clone)]
pub struct UpstreamEndpoint {
    pub pool: Arc<str>,
    pub addr: UpstreamAddr,
    pub mode: TransportMode,
    pub tls_name: String,
    pub timeout: Duration,
}

impl UpstreamEndpoint {
    pub fn from_config(pool: &str, server: &UpstreamServerConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            pool: Arc::from(pool),
            addr: server.upstream_addr()?,
            mode: server.transport()?,
            tls_name: server.server_name(),
            timeout: server.timeout(),
        })
    }
}

/// One persistent connection to one upstream, shared by real queries and
/// health probes alike.
pub struct UpstreamClient {
    name: String,
    endpoint: UpstreamEndpoint,
    transport: Transport,
    metrics: Arc<RelayMetrics>,
    shutdown: CancellationToken,
}

impl UpstreamClient {
    /// Dial eagerly; a failure here is fatal to startup.
    pub async fn connect(
        endpoint: UpstreamEndpoint,
        metrics: Arc<RelayMetrics>,
        shutdown: &CancellationToken,
    ) -> Result<Self, DomainError> {
        let transport = Transport::connect(
            &endpoint.addr,
            endpoint.mode,
            &endpoint.tls_name,
            endpoint.timeout,
            shutdown,
        )
        .await?;

        debug!(
            pool = %endpoint.pool,
            upstream = %endpoint.addr,
            transport = %endpoint.mode,
            "Upstream client connected"
        );

        Ok(Self {
            name: endpoint.addr.to_string(),
            endpoint,
            transport,
            metrics,
            shutdown: shutdown.clone(),
        })
    }

    pub fn endpoint(&self) -> &UpstreamEndpoint {
        &self.endpoint
    }

    pub async fn close(&self) {
        self.transport.close().await;
        debug!(upstream = %self.name, "Upstream client closed");
    }

    async fn exchange(&self, query: &Message) -> Result<Message, DomainError> {
        let wire = codec::encode(query)?;

        let bytes = tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => return Err(DomainError::ShuttingDown),
            result = tokio::time::timeout(self.endpoint.timeout, self.transport.exchange(&wire)) => {
                result.map_err(|_| DomainError::TransportTimeout {
                    server: self.name.clone(),
                })??
            }
        };

        let mut response = codec::decode(&bytes, &self.name)?;
        response.metadata.id = query.id;
        Ok(response)
    }
}

#[async_trait]
impl UpstreamExchange for UpstreamClient {
    async fn send(&self, query: &Message) -> Result<Message, DomainError> {
        let start = Instant::now();
        let result = self.exchange(query).await;
        self.metrics.observe_exchange(
            &self.endpoint.pool,
            start.elapsed(),
            result.as_ref().ok().map(|response| response.response_code),
        );
        result
    }

    fn name(&self) -> &str {
        &self.name
    }
}
