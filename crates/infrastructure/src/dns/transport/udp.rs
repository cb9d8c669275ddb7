use bytes::Bytes;
use ferrous_relay_domain::DomainError;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::map_io_error;
use super::pending::PendingQueries;
use crate::dns::codec::{set_wire_id, wire_id, MAX_MESSAGE_SIZE};

/// One connected datagram socket shared by every caller. A reader task
/// routes responses back to waiters by transaction id.
pub struct UdpTransport {
    server: Arc<str>,
    socket: Arc<UdpSocket>,
    pending: Arc<PendingQueries>,
    reader_stop: CancellationToken,
}

impl UdpTransport {
    pub async fn connect(
        addr: SocketAddr,
        server: &str,
        shutdown: &CancellationToken,
    ) -> Result<Self, DomainError> {
        let bind_addr: SocketAddr = if addr.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };

        let socket = UdpSocket::bind(bind_addr)
            .await
            .map_err(|e| map_io_error(server, e))?;
        socket
            .connect(addr)
            .await
            .map_err(|e| map_io_error(server, e))?;

        let transport = Self {
            server: Arc::from(server),
            socket: Arc::new(socket),
            pending: Arc::new(PendingQueries::new()),
            reader_stop: shutdown.child_token(),
        };
        transport.spawn_reader();

        debug!(upstream = %server, "UDP upstream connected");
        Ok(transport)
    }

    fn spawn_reader(&self) {
        let socket = Arc::clone(&self.socket);
        let pending = Arc::clone(&self.pending);
        let stop = self.reader_stop.clone();
        let server = Arc::clone(&self.server);

        tokio::spawn(async move {
            let mut buf = vec![0u8; MAX_MESSAGE_SIZE];
            loop {
                tokio::select! {
                    _ = stop.cancelled() => break,
                    result = socket.recv(&mut buf) => match result {
                        Ok(len) => {
                            let Some(id) = wire_id(&buf[..len]) else {
                                continue;
                            };
                            if !pending.complete(id, Bytes::copy_from_slice(&buf[..len])) {
                                trace!(upstream = %server, id, "Discarding response with unknown id");
                            }
                        }
                        // ICMP errors surface here on connected sockets;
                        // the socket stays usable.
                        Err(e) => trace!(upstream = %server, error = %e, "UDP receive error"),
                    }
                }
            }
            pending.fail_all();
            trace!(upstream = %server, "UDP reader stopped");
        });
    }

    pub async fn exchange(&self, query: &[u8]) -> Result<Bytes, DomainError> {
        if self.reader_stop.is_cancelled() {
            return Err(DomainError::ShuttingDown);
        }
        let mut pending = self.pending.register(&self.server)?;

        let mut wire = query.to_vec();
        set_wire_id(&mut wire, pending.id());
        self.socket
            .send(&wire)
            .await
            .map_err(|e| map_io_error(&self.server, e))?;

        pending
            .response()
            .await
            .ok_or_else(|| DomainError::TransportConnectionReset {
                server: self.server.to_string(),
            })
    }

    pub fn close(&self) {
        self.reader_stop.cancel();
    }
}
