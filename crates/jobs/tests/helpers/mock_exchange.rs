use async_trait::async_trait;
use ferrous_relay_application::ports::UpstreamExchange;
use ferrous_relay_domain::DomainError;
use hickory_proto::op::{Message, MessageType};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Counts sends and answers or fails depending on `healthy`.
pub struct CountingExchange {
    sends: AtomicUsize,
    healthy: AtomicBool,
}

impl CountingExchange {
    pub fn new(healthy: bool) -> Self {
        Self {
            sends: AtomicUsize::new(0),
            healthy: AtomicBool::new(healthy),
        }
    }

    pub fn sends(&self) -> usize {
        self.sends.load(Ordering::SeqCst)
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }
}

#[async_trait]
impl UpstreamExchange for CountingExchange {
    async fn send(&self, query: &Message) -> Result<Message, DomainError> {
        self.sends.fetch_add(1, Ordering::SeqCst);
        if self.healthy.load(Ordering::SeqCst) {
            Ok(Message::new(query.id, MessageType::Response, query.op_code))
        } else {
            Err(DomainError::TransportConnectionRefused {
                server: "mock".to_string(),
                reason: "refused".to_string(),
            })
        }
    }

    fn name(&self) -> &str {
        "mock:53"
    }
}
