use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;

pub const DEFAULT_DNS_PORT: u16 = 53;

/// Upstream server address as written in configuration, with the port
/// filled in when it was omitted. The host may be an IP literal or a name
/// that is resolved when the connection is dialed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UpstreamAddr {
    host: Arc<str>,
    port: u16,
}

impl UpstreamAddr {
    pub fn new(host: impl Into<Arc<str>>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// The socket address when the host is an IP literal.
    pub fn socket_addr(&self) -> Option<SocketAddr> {
        self.host
            .parse::<IpAddr>()
            .ok()
            .map(|ip| SocketAddr::new(ip, self.port))
    }

    /// `host:port` form suitable for the system resolver.
    pub fn lookup_target(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for UpstreamAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

impl FromStr for UpstreamAddr {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("empty upstream address".to_string());
        }

        if let Ok(addr) = s.parse::<SocketAddr>() {
            return Ok(Self::new(addr.ip().to_string(), addr.port()));
        }

        if let Ok(ip) = s.parse::<IpAddr>() {
            return Ok(Self::new(ip.to_string(), DEFAULT_DNS_PORT));
        }

        if let Some(inner) = s.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
            let ip = inner
                .parse::<IpAddr>()
                .map_err(|e| format!("invalid address '{}': {}", s, e))?;
            return Ok(Self::new(ip.to_string(), DEFAULT_DNS_PORT));
        }

        match s.rsplit_once(':') {
            Some((host, port)) if !host.is_empty() && !host.contains(':') => {
                let port = port
                    .parse::<u16>()
                    .map_err(|_| format!("invalid port in address '{}'", s))?;
                Ok(Self::new(host, port))
            }
            Some(_) => Err(format!("invalid address '{}'", s)),
            None => Ok(Self::new(s, DEFAULT_DNS_PORT)),
        }
    }
}
