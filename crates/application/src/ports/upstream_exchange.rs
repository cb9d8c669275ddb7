use async_trait::async_trait;
use ferrous_relay_domain::DomainError;
use hickory_proto::op::Message;

/// A query/response exchange with one upstream server over its shared
/// connection. Implementations must be safe to call concurrently.
#[async_trait]
pub trait UpstreamExchange: Send + Sync {
    async fn send(&self, query: &Message) -> Result<Message, DomainError>;

    /// Human readable identity of the upstream, e.g. "8.8.8.8:53".
    fn name(&self) -> &str;
}
