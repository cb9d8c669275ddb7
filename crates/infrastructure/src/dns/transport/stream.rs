use bytes::Bytes;
use ferrous_relay_domain::DomainError;
use rustls::pki_types::ServerName;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, ReadHalf, WriteHalf};
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use super::pending::PendingQueries;
use super::tcp::{connect_tcp, read_with_length_prefix, send_with_length_prefix};
use super::tls;
use crate::dns::codec::{set_wire_id, wire_id};

trait DnsStream: AsyncRead + AsyncWrite + Send + Unpin {}
impl<T: AsyncRead + AsyncWrite + Send + Unpin> DnsStream for T {}

type BoxedStream = Box<dyn DnsStream>;

/// Frames waiting for the writer task. Callers block once it is full.
const WRITE_QUEUE_DEPTH: usize = 256;

struct OutboundFrame {
    id: u16,
    wire: Vec<u8>,
}

/// Live stream connection. Frames go through a single writer task, so a
/// caller that gives up mid-send never leaves half a frame on the wire.
struct StreamConn {
    frames: mpsc::Sender<OutboundFrame>,
    pending: Arc<PendingQueries>,
    closed: CancellationToken,
}

impl StreamConn {
    fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    async fn exchange(&self, query: &[u8], server: &str) -> Result<Bytes, DomainError> {
        let reset = || DomainError::TransportConnectionReset {
            server: server.to_string(),
        };

        let mut pending = self.pending.register(server)?;
        if self.is_closed() {
            return Err(reset());
        }

        let mut wire = query.to_vec();
        set_wire_id(&mut wire, pending.id());
        self.frames
            .send(OutboundFrame {
                id: pending.id(),
                wire,
            })
            .await
            .map_err(|_| reset())?;

        pending.response().await.ok_or_else(reset)
    }
}

/// Multiplexed TCP or TLS upstream connection. When the peer closes the
/// stream, waiters fail and the next exchange dials a fresh one.
pub struct StreamTransport {
    server: Arc<str>,
    addr: SocketAddr,
    tls_name: Option<ServerName<'static>>,
    connect_timeout: Duration,
    conn: Mutex<Arc<StreamConn>>,
    shutdown: CancellationToken,
}

impl StreamTransport {
    pub async fn connect(
        addr: SocketAddr,
        server: &str,
        tls_name: Option<&str>,
        connect_timeout: Duration,
        shutdown: &CancellationToken,
    ) -> Result<Self, DomainError> {
        let tls_name = tls_name.map(tls::server_name).transpose()?;
        let conn = dial(addr, server, tls_name.clone(), connect_timeout, shutdown).await?;
        debug!(upstream = %server, tls = tls_name.is_some(), "Stream upstream connected");

        Ok(Self {
            server: Arc::from(server),
            addr,
            tls_name,
            connect_timeout,
            conn: Mutex::new(conn),
            shutdown: shutdown.clone(),
        })
    }

    async fn current(&self) -> Result<Arc<StreamConn>, DomainError> {
        let mut conn = self.conn.lock().await;
        if conn.is_closed() {
            if self.shutdown.is_cancelled() {
                return Err(DomainError::ShuttingDown);
            }
            *conn = dial(
                self.addr,
                &self.server,
                self.tls_name.clone(),
                self.connect_timeout,
                &self.shutdown,
            )
            .await?;
            info!(upstream = %self.server, "Upstream stream redialed");
        }
        Ok(Arc::clone(&conn))
    }

    pub async fn exchange(&self, query: &[u8]) -> Result<Bytes, DomainError> {
        let conn = self.current().await?;
        conn.exchange(query, &self.server).await
    }

    pub async fn close(&self) {
        self.conn.lock().await.closed.cancel();
    }
}

async fn dial(
    addr: SocketAddr,
    server: &str,
    tls_name: Option<ServerName<'static>>,
    timeout: Duration,
    shutdown: &CancellationToken,
) -> Result<Arc<StreamConn>, DomainError> {
    let tcp = connect_tcp(addr, server, timeout).await?;
    let stream: BoxedStream = match tls_name {
        Some(name) => Box::new(tls::handshake(tcp, name, server, timeout).await?),
        None => Box::new(tcp),
    };

    let (reader, writer) = tokio::io::split(stream);
    let (frames, queue) = mpsc::channel(WRITE_QUEUE_DEPTH);
    let conn = Arc::new(StreamConn {
        frames,
        pending: Arc::new(PendingQueries::new()),
        closed: shutdown.child_token(),
    });
    spawn_writer(
        writer,
        queue,
        Arc::clone(&conn.pending),
        conn.closed.clone(),
        server,
        timeout,
    );
    spawn_reader(reader, Arc::clone(&conn.pending), conn.closed.clone(), server);
    Ok(conn)
}

/// Writes whole frames in queue order. Frames whose caller already gave up
/// are skipped. A write error, or a single frame stalled for longer than
/// `stall_timeout`, closes the connection so the next exchange redials.
fn spawn_writer(
    mut writer: WriteHalf<BoxedStream>,
    mut queue: mpsc::Receiver<OutboundFrame>,
    pending: Arc<PendingQueries>,
    closed: CancellationToken,
    server: &str,
    stall_timeout: Duration,
) {
    let server = server.to_string();
    tokio::spawn(async move {
        loop {
            let frame = tokio::select! {
                _ = closed.cancelled() => break,
                frame = queue.recv() => match frame {
                    Some(frame) => frame,
                    None => break,
                },
            };
            if !pending.is_waiting(frame.id) {
                trace!(upstream = %server, id = frame.id, "Skipping abandoned query");
                continue;
            }

            let written = tokio::time::timeout(
                stall_timeout,
                send_with_length_prefix(&mut writer, &frame.wire, &server),
            )
            .await;
            match written {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    debug!(upstream = %server, error = %e, "Upstream stream write failed");
                    break;
                }
                Err(_) => {
                    debug!(upstream = %server, "Upstream stream write stalled");
                    break;
                }
            }
        }
        closed.cancel();
        pending.fail_all();
    });
}

fn spawn_reader(
    mut reader: ReadHalf<BoxedStream>,
    pending: Arc<PendingQueries>,
    closed: CancellationToken,
    server: &str,
) {
    let server = server.to_string();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = closed.cancelled() => break,
                frame = read_with_length_prefix(&mut reader, &server) => match frame {
                    Ok(frame) => {
                        let Some(id) = wire_id(&frame) else {
                            continue;
                        };
                        if !pending.complete(id, Bytes::from(frame)) {
                            trace!(upstream = %server, id, "Discarding response with unknown id");
                        }
                    }
                    Err(e) => {
                        debug!(upstream = %server, error = %e, "Upstream stream closed");
                        break;
                    }
                }
            }
        }
        closed.cancel();
        pending.fail_all();
    });
}
