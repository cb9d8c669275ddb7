//! Upstream transports. Every transport multiplexes concurrent queries over
//! a single connection by rewriting transaction ids on the way out and
//! routing responses back by id.

mod pending;
pub mod resolver;
pub mod stream;
pub mod tcp;
pub mod tls;
pub mod udp;

use bytes::Bytes;
use ferrous_relay_domain::{DomainError, TransportMode, UpstreamAddr};
use std::io;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub use stream::StreamTransport;
pub use udp::UdpTransport;

pub enum Transport {
    Udp(UdpTransport),
    Stream(StreamTransport),
}

impl Transport {
    /// Resolve `upstream` and establish the connection for `mode`.
    pub async fn connect(
        upstream: &UpstreamAddr,
        mode: TransportMode,
        tls_name: &str,
        timeout: Duration,
        shutdown: &CancellationToken,
    ) -> Result<Self, DomainError> {
        let server = upstream.to_string();
        let addr = resolver::resolve_first(upstream, timeout).await?;

        match mode {
            TransportMode::Udp => Ok(Self::Udp(
                UdpTransport::connect(addr, &server, shutdown).await?,
            )),
            TransportMode::Tcp => Ok(Self::Stream(
                StreamTransport::connect(addr, &server, None, timeout, shutdown).await?,
            )),
            TransportMode::TcpTls => Ok(Self::Stream(
                StreamTransport::connect(addr, &server, Some(tls_name), timeout, shutdown)
                    .await?,
            )),
        }
    }

    /// Send encoded `query` and wait for the response carrying the same
    /// wire id. The returned bytes still carry the rewritten id.
    pub async fn exchange(&self, query: &[u8]) -> Result<Bytes, DomainError> {
        match self {
            Self::Udp(t) => t.exchange(query).await,
            Self::Stream(t) => t.exchange(query).await,
        }
    }

    pub async fn close(&self) {
        match self {
            Self::Udp(t) => t.close(),
            Self::Stream(t) => t.close().await,
        }
    }
}

pub(crate) fn map_io_error(server: &str, error: io::Error) -> DomainError {
    let server = server.to_string();
    match error.kind() {
        io::ErrorKind::ConnectionRefused => DomainError::TransportConnectionRefused {
            server,
            reason: error.to_string(),
        },
        io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::BrokenPipe
        | io::ErrorKind::NotConnected
        | io::ErrorKind::UnexpectedEof => DomainError::TransportConnectionReset { server },
        io::ErrorKind::TimedOut => DomainError::TransportTimeout { server },
        _ => DomainError::TransportIo {
            server,
            reason: error.to_string(),
        },
    }
}
