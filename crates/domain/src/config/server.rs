use serde::{Deserialize, Serialize};

/// Which inbound listeners are started on `listen_addr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub enum ListenMode {
    #[default]
    #[serde(rename = "udp")]
    Udp,
    #[serde(rename = "tcp")]
    Tcp,
    #[serde(rename = "udp+tcp")]
    UdpTcp,
}

impl ListenMode {
    pub fn serves_udp(&self) -> bool {
        matches!(self, Self::Udp | Self::UdpTcp)
    }

    pub fn serves_tcp(&self) -> bool {
        matches!(self, Self::Tcp | Self::UdpTcp)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    #[serde(default)]
    pub listen_net: ListenMode,

    /// Admin listener for liveness and metrics.
    #[serde(default = "default_http_addr")]
    pub http_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            listen_net: ListenMode::default(),
            http_addr: default_http_addr(),
        }
    }
}

fn default_listen_addr() -> String {
    "127.0.0.1:5353".to_string()
}

fn default_http_addr() -> String {
    "127.0.0.1:8080".to_string()
}
