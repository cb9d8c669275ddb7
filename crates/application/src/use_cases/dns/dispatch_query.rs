use ferrous_relay_domain::DnsRequest;
use hickory_proto::op::{Message, ResponseCode};
use std::sync::Arc;
use tracing::{debug, error};

use crate::ports::ResponseSink;
use crate::services::{send_error, RouteTable};

/// What the dispatcher did with a query. Every variant implies exactly one
/// response was written (by the dispatcher or by the routed handler).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    NoQuestion,
    BadRequester,
    NoRoute,
    Routed { handler: String },
}

/// Single per-query entry point: extract the routing key, walk the route
/// table and hand the query to whatever matched.
pub struct DispatchQueryUseCase {
    routes: Arc<RouteTable>,
}

impl DispatchQueryUseCase {
    pub fn new(routes: Arc<RouteTable>) -> Self {
        Self { routes }
    }

    pub async fn execute(&self, query: &Message, sink: &mut dyn ResponseSink) -> DispatchOutcome {
        let Some(question) = query.queries.first() else {
            debug!(id = query.id, "Query carries no question");
            send_error(sink, query, ResponseCode::ServFail).await;
            return DispatchOutcome::NoQuestion;
        };

        let Some(requester) = sink.requester() else {
            error!(id = query.id, "Unable to determine requester address");
            send_error(sink, query, ResponseCode::ServFail).await;
            return DispatchOutcome::BadRequester;
        };

        let request = DnsRequest::new(requester.ip(), question.name().to_ascii());

        let Some(handler) = self.routes.find(&request) else {
            debug!(client = %request.client_ip, domain = %request.domain, "No route matched");
            send_error(sink, query, ResponseCode::ServFail).await;
            return DispatchOutcome::NoRoute;
        };

        debug!(
            client = %request.client_ip,
            domain = %request.domain,
            handler = handler.name(),
            "Dispatching query"
        );
        handler.handle(query, sink).await;
        DispatchOutcome::Routed {
            handler: handler.name().to_string(),
        }
    }
}
