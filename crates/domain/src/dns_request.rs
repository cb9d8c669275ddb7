use std::net::IpAddr;
use std::sync::Arc;

/// Routing key extracted from one inbound query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsRequest {
    pub client_ip: IpAddr,
    pub domain: Arc<str>,
}

impl DnsRequest {
    pub fn new(client_ip: IpAddr, domain: impl Into<Arc<str>>) -> Self {
        Self {
            client_ip: client_ip.to_canonical(),
            domain: domain.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapped_ipv6_is_canonicalised() {
        let mapped: IpAddr = "::ffff:10.1.2.3".parse().unwrap();
        let request = DnsRequest::new(mapped, "example.com.");
        assert_eq!(request.client_ip, "10.1.2.3".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_plain_ipv6_is_untouched() {
        let addr: IpAddr = "2001:db8::1".parse().unwrap();
        let request = DnsRequest::new(addr, "example.com.");
        assert_eq!(request.client_ip, addr);
        assert_eq!(&*request.domain, "example.com.");
    }
}
