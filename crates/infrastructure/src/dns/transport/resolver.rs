use ferrous_relay_domain::{DomainError, UpstreamAddr};
use std::net::SocketAddr;
use std::time::Duration;

/// Address to dial for `upstream`. IP literals are used as-is; host names go
/// through the system resolver and the first address wins.
pub async fn resolve_first(
    upstream: &UpstreamAddr,
    timeout: Duration,
) -> Result<SocketAddr, DomainError> {
    if let Some(addr) = upstream.socket_addr() {
        return Ok(addr);
    }

    let target = upstream.lookup_target();
    let mut addrs = tokio::time::timeout(timeout, tokio::net::lookup_host(&target))
        .await
        .map_err(|_| DomainError::TransportTimeout {
            server: target.clone(),
        })?
        .map_err(|e| DomainError::Resolution {
            server: target.clone(),
            reason: e.to_string(),
        })?;

    addrs.next().ok_or_else(|| DomainError::Resolution {
        server: target.clone(),
        reason: "no addresses found".to_string(),
    })
}
