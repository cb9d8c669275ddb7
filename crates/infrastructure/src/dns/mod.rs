pub mod client;
pub mod codec;
pub mod listener;
pub mod transport;

pub use client::UpstreamClient;
pub use listener::{TcpListenerServer, UdpListenerServer};
