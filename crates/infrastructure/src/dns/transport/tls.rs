//! DNS-over-TLS (RFC 7858) connection setup.

use ferrous_relay_domain::DomainError;
use rustls::pki_types::ServerName;
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tracing::debug;

/// Shared TLS config, built once and reused by every DoT upstream.
static SHARED_TLS_CONFIG: LazyLock<Arc<rustls::ClientConfig>> = LazyLock::new(|| {
    let mut root_store = rustls::RootCertStore::empty();
    root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let config = rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    Arc::new(config)
});

pub(crate) fn server_name(name: &str) -> Result<ServerName<'static>, DomainError> {
    ServerName::try_from(name.to_string()).map_err(|_| DomainError::InvalidServerName(name.to_string()))
}

pub(crate) async fn handshake(
    tcp_stream: TcpStream,
    name: ServerName<'static>,
    server: &str,
    timeout: Duration,
) -> Result<TlsStream<TcpStream>, DomainError> {
    let connector = tokio_rustls::TlsConnector::from(Arc::clone(&SHARED_TLS_CONFIG));

    let tls_stream = tokio::time::timeout(timeout, connector.connect(name, tcp_stream))
        .await
        .map_err(|_| DomainError::TransportTimeout {
            server: server.to_string(),
        })?
        .map_err(|e| DomainError::TlsHandshake {
            server: server.to_string(),
            reason: e.to_string(),
        })?;

    debug!(upstream = %server, "TLS connection established");
    Ok(tls_stream)
}
