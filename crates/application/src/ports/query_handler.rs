use async_trait::async_trait;
use hickory_proto::op::Message;

use super::ResponseSink;

/// Terminal target of a route. Implementations write exactly one response
/// to the sink for every query they are handed.
#[async_trait]
pub trait QueryHandler: Send + Sync {
    async fn handle(&self, query: &Message, sink: &mut dyn ResponseSink);

    /// Short label used in logs ("drop" or the pool name).
    fn name(&self) -> &str;
}
