use async_trait::async_trait;
use ferrous_relay_application::ports::ResponseSink;
use ferrous_relay_application::use_cases::DispatchQueryUseCase;
use ferrous_relay_domain::DomainError;
use hickory_proto::op::Message;
use socket2::{Protocol, Type};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::new_socket;
use crate::dns::codec;
use crate::dns::transport::tcp::{read_with_length_prefix, send_with_length_prefix};

const IDLE_TIMEOUT: Duration = Duration::from_secs(10);
const LISTEN_BACKLOG: i32 = 1024;

pub struct TcpListenerServer {
    listener: TcpListener,
    dispatcher: Arc<DispatchQueryUseCase>,
}

impl TcpListenerServer {
    pub fn bind(addr: SocketAddr, dispatcher: Arc<DispatchQueryUseCase>) -> io::Result<Self> {
        let socket = new_socket(addr, Type::STREAM, Protocol::TCP)?;
        socket.listen(LISTEN_BACKLOG)?;
        let std_listener: std::net::TcpListener = socket.into();

        Ok(Self {
            listener: TcpListener::from_std(std_listener)?,
            dispatcher,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub async fn run(self, shutdown: CancellationToken) {
        if let Ok(addr) = self.local_addr() {
            info!(bind_address = %addr, "TCP listener ready");
        }

        loop {
            let (stream, peer) = tokio::select! {
                _ = shutdown.cancelled() => break,
                result = self.listener.accept() => match result {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        error!(error = %e, "TCP accept error");
                        continue;
                    }
                }
            };

            let dispatcher = Arc::clone(&self.dispatcher);
            let shutdown = shutdown.clone();
            tokio::spawn(async move {
                serve_connection(stream, peer, dispatcher, shutdown).await;
            });
        }

        info!("TCP listener stopped");
    }
}

async fn serve_connection(
    stream: TcpStream,
    peer: SocketAddr,
    dispatcher: Arc<DispatchQueryUseCase>,
    shutdown: CancellationToken,
) {
    let peer_label = peer.to_string();
    let (mut reader, writer) = stream.into_split();
    let writer = Arc::new(Mutex::new(writer));

    loop {
        let frame = tokio::select! {
            _ = shutdown.cancelled() => break,
            result = tokio::time::timeout(IDLE_TIMEOUT, read_with_length_prefix(&mut reader, &peer_label)) => {
                match result {
                    Ok(Ok(frame)) => frame,
                    Ok(Err(_)) => break,
                    Err(_) => {
                        debug!(client = %peer, "Closing idle TCP connection");
                        break;
                    }
                }
            }
        };

        let query = match Message::from_vec(&frame) {
            Ok(query) => query,
            Err(e) => {
                debug!(client = %peer, error = %e, "Dropping undecodable TCP frame");
                continue;
            }
        };

        let dispatcher = Arc::clone(&dispatcher);
        let mut sink = TcpResponseSink {
            writer: Arc::clone(&writer),
            peer,
        };
        tokio::spawn(async move {
            dispatcher.execute(&query, &mut sink).await;
        });
    }
}

struct TcpResponseSink {
    writer: Arc<Mutex<OwnedWriteHalf>>,
    peer: SocketAddr,
}

#[async_trait]
impl ResponseSink for TcpResponseSink {
    async fn write(&mut self, response: Message) -> Result<(), DomainError> {
        let wire = codec::encode(&response)?;
        let mut writer = self.writer.lock().await;
        send_with_length_prefix(&mut *writer, &wire, &self.peer.to_string())
            .await
            .map_err(|e| DomainError::ResponseWrite(e.to_string()))
    }

    fn requester(&self) -> Option<SocketAddr> {
        Some(self.peer)
    }
}
