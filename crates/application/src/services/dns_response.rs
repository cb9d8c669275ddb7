use hickory_proto::op::{Message, MessageType, ResponseCode};
use tracing::warn;

use crate::ports::ResponseSink;

/// Empty answer to `query` carrying `code`, echoing its id and questions.
pub fn error_response(query: &Message, code: ResponseCode) -> Message {
    let mut response = Message::new(query.id, MessageType::Response, query.op_code);
    response.metadata.recursion_desired = query.recursion_desired;
    response.metadata.recursion_available = true;
    response.metadata.response_code = code;
    response.add_queries(query.queries.iter().cloned());
    response
}

/// Write an error response; write failures are logged and swallowed.
pub async fn send_error(sink: &mut dyn ResponseSink, query: &Message, code: ResponseCode) {
    if let Err(e) = sink.write(error_response(query, code)).await {
        warn!(code = ?code, error = %e, "Failed to write error response");
    }
}
