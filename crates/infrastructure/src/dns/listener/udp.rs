use async_trait::async_trait;
use ferrous_relay_application::ports::ResponseSink;
use ferrous_relay_application::use_cases::DispatchQueryUseCase;
use ferrous_relay_domain::DomainError;
use hickory_proto::op::Message;
use socket2::{Protocol, Type};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::new_socket;
use crate::dns::codec::{self, MAX_MESSAGE_SIZE};

const SOCKET_BUFFER_SIZE: usize = 512 * 1024;

pub struct UdpListenerServer {
    socket: Arc<UdpSocket>,
    dispatcher: Arc<DispatchQueryUseCase>,
}

impl UdpListenerServer {
    pub fn bind(addr: SocketAddr, dispatcher: Arc<DispatchQueryUseCase>) -> io::Result<Self> {
        let socket = new_socket(addr, Type::DGRAM, Protocol::UDP)?;
        socket.set_recv_buffer_size(SOCKET_BUFFER_SIZE)?;
        socket.set_send_buffer_size(SOCKET_BUFFER_SIZE)?;
        let std_socket: std::net::UdpSocket = socket.into();

        Ok(Self {
            socket: Arc::new(UdpSocket::from_std(std_socket)?),
            dispatcher,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    pub async fn run(self, shutdown: CancellationToken) {
        if let Ok(addr) = self.local_addr() {
            info!(bind_address = %addr, "UDP listener ready");
        }
        let mut buf = vec![0u8; MAX_MESSAGE_SIZE];

        loop {
            let (len, peer) = tokio::select! {
                _ = shutdown.cancelled() => break,
                result = self.socket.recv_from(&mut buf) => match result {
                    Ok(received) => received,
                    Err(e) => {
                        error!(error = %e, "UDP recv error");
                        continue;
                    }
                }
            };

            let query = match Message::from_vec(&buf[..len]) {
                Ok(query) => query,
                Err(e) => {
                    debug!(client = %peer, error = %e, "Dropping undecodable datagram");
                    continue;
                }
            };

            let dispatcher = Arc::clone(&self.dispatcher);
            let mut sink = UdpResponseSink {
                socket: Arc::clone(&self.socket),
                peer,
            };
            tokio::spawn(async move {
                dispatcher.execute(&query, &mut sink).await;
            });
        }

        info!("UDP listener stopped");
    }
}

struct UdpResponseSink {
    socket: Arc<UdpSocket>,
    peer: SocketAddr,
}

#[async_trait]
impl ResponseSink for UdpResponseSink {
    async fn write(&mut self, response: Message) -> Result<(), DomainError> {
        let wire = codec::encode(&response)?;
        self.socket
            .send_to(&wire, self.peer)
            .await
            .map_err(|e| DomainError::ResponseWrite(e.to_string()))?;
        Ok(())
    }

    fn requester(&self) -> Option<SocketAddr> {
        Some(self.peer)
    }
}
