#![allow(dead_code)]

mod mock_upstreams;

pub use mock_upstreams::{make_query, MockExchange, MockReply, RecordingSink};
