use async_trait::async_trait;
use ferrous_relay_application::ports::{ResponseSink, UpstreamExchange};
use ferrous_relay_domain::DomainError;
use hickory_proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::{Name, RecordType};
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub fn make_query(name: &str, id: u16) -> Message {
    let mut message = Message::new(id, MessageType::Query, OpCode::Query);
    message.metadata.recursion_desired = true;
    message.add_query(Query::query(Name::from_str(name).unwrap(), RecordType::A));
    message
}

#[derive(Debug, Clone)]
pub enum MockReply {
    Answer(ResponseCode),
    Fail(DomainError),
    Hang,
}

pub struct MockExchange {
    name: String,
    reply: Mutex<MockReply>,
    calls: AtomicUsize,
}

impl MockExchange {
    pub fn new(name: &str, reply: MockReply) -> Self {
        Self {
            name: name.to_string(),
            reply: Mutex::new(reply),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn answering(name: &str) -> Self {
        Self::new(name, MockReply::Answer(ResponseCode::NoError))
    }

    pub fn failing(name: &str) -> Self {
        Self::new(
            name,
            MockReply::Fail(DomainError::TransportTimeout {
                server: name.to_string(),
            }),
        )
    }

    pub fn set_reply(&self, reply: MockReply) {
        *self.reply.lock().unwrap() = reply;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UpstreamExchange for MockExchange {
    async fn send(&self, query: &Message) -> Result<Message, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.reply.lock().unwrap().clone();
        match reply {
            MockReply::Answer(code) => {
                let mut response =
                    Message::new(query.id, MessageType::Response, query.op_code);
                response.metadata.response_code = code;
                response.add_queries(query.queries.iter().cloned());
                Ok(response)
            }
            MockReply::Fail(e) => Err(e),
            MockReply::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(DomainError::ShuttingDown)
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

pub struct RecordingSink {
    requester: Option<SocketAddr>,
    pub responses: Vec<Message>,
    fail_writes: bool,
}

impl RecordingSink {
    pub fn new(requester: &str) -> Self {
        Self {
            requester: Some(requester.parse().unwrap()),
            responses: Vec::new(),
            fail_writes: false,
        }
    }

    pub fn without_requester() -> Self {
        Self {
            requester: None,
            responses: Vec::new(),
            fail_writes: false,
        }
    }

    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn only_response(&self) -> &Message {
        assert_eq!(self.responses.len(), 1, "expected exactly one response");
        &self.responses[0]
    }
}

#[async_trait]
impl ResponseSink for RecordingSink {
    async fn write(&mut self, response: Message) -> Result<(), DomainError> {
        if self.fail_writes {
            return Err(DomainError::ResponseWrite("sink closed".to_string()));
        }
        self.responses.push(response);
        Ok(())
    }

    fn requester(&self) -> Option<SocketAddr> {
        self.requester
    }
}
