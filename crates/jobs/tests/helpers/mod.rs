#![allow(dead_code)]

mod mock_exchange;

pub use mock_exchange::CountingExchange;
