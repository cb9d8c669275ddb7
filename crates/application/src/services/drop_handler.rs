use async_trait::async_trait;
use hickory_proto::op::{Message, ResponseCode};

use super::dns_response::send_error;
use crate::ports::{QueryHandler, ResponseSink};

/// Answers every query with REFUSED and never touches an upstream.
#[derive(Debug, Default, Clone, Copy)]
pub struct DropHandler;

#[async_trait]
impl QueryHandler for DropHandler {
    async fn handle(&self, query: &Message, sink: &mut dyn ResponseSink) {
        send_error(sink, query, ResponseCode::Refused).await;
    }

    fn name(&self) -> &str {
        "drop"
    }
}
