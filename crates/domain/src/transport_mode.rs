use std::fmt;
use std::str::FromStr;

/// How a connection to an upstream server is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransportMode {
    #[default]
    Udp,
    Tcp,
    TcpTls,
}

impl TransportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Udp => "udp",
            Self::Tcp => "tcp",
            Self::TcpTls => "tcp-tls",
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransportMode {
    type Err = String;

    /// An empty string selects UDP, matching an unset `net` key.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "udp" => Ok(Self::Udp),
            "tcp" => Ok(Self::Tcp),
            "tcp-tls" => Ok(Self::TcpTls),
            other => Err(format!(
                "unknown transport '{}' (expected udp, tcp or tcp-tls)",
                other
            )),
        }
    }
}
