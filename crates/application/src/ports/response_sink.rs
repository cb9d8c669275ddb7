use async_trait::async_trait;
use ferrous_relay_domain::DomainError;
use hickory_proto::op::Message;
use std::net::SocketAddr;

/// Writes a response back to whoever sent the query.
#[async_trait]
pub trait ResponseSink: Send {
    async fn write(&mut self, response: Message) -> Result<(), DomainError>;

    /// Transport-level peer address, if the listener could determine one.
    fn requester(&self) -> Option<SocketAddr>;
}
