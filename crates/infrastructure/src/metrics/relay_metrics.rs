use ferrous_relay_application::ports::MetricsExporter;
use ferrous_relay_domain::DomainError;
use hickory_proto::op::ResponseCode;
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::borrow::Cow;
use std::time::Duration;

/// Label used when an exchange produced no response at all.
pub const ERROR_LABEL: &str = "error";

/// Per-pool upstream exchange metrics, registered on a private registry
/// and handed to every client that records into it.
pub struct RelayMetrics {
    registry: Registry,
    latency: HistogramVec,
    responses: IntCounterVec,
}

impl RelayMetrics {
    pub fn new() -> Result<Self, DomainError> {
        let registry = Registry::new();

        let latency = HistogramVec::new(
            HistogramOpts::new(
                "ferrous_relay_client_pool_latency_seconds",
                "Upstream exchange latency per pool (seconds)",
            )
            .buckets(vec![
                0.001, 0.002, 0.005, 0.01, 0.02, 0.05, 0.1, 0.2, 0.5, 1.0, 2.0, 5.0,
            ]),
            &["pool"],
        )
        .map_err(|e| DomainError::Metrics(e.to_string()))?;

        let responses = IntCounterVec::new(
            Opts::new(
                "ferrous_relay_client_responses_total",
                "Upstream responses per pool and response code",
            ),
            &["pool", "rcode"],
        )
        .map_err(|e| DomainError::Metrics(e.to_string()))?;

        registry
            .register(Box::new(latency.clone()))
            .map_err(|e| DomainError::Metrics(e.to_string()))?;
        registry
            .register(Box::new(responses.clone()))
            .map_err(|e| DomainError::Metrics(e.to_string()))?;

        Ok(Self {
            registry,
            latency,
            responses,
        })
    }

    /// Record one exchange; `rcode` is `None` when no response arrived.
    pub fn observe_exchange(&self, pool: &str, elapsed: Duration, rcode: Option<ResponseCode>) {
        self.latency
            .with_label_values(&[pool])
            .observe(elapsed.as_secs_f64());

        let label = rcode.map_or(Cow::Borrowed(ERROR_LABEL), rcode_label);
        self.responses
            .with_label_values(&[pool, label.as_ref()])
            .inc();
    }

    pub fn response_count(&self, pool: &str, rcode: &str) -> u64 {
        self.responses.with_label_values(&[pool, rcode]).get()
    }

    pub fn latency_sample_count(&self, pool: &str) -> u64 {
        self.latency.with_label_values(&[pool]).get_sample_count()
    }
}

impl MetricsExporter for RelayMetrics {
    fn export(&self) -> Result<String, DomainError> {
        let mut buf = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buf)
            .map_err(|e| DomainError::Metrics(e.to_string()))?;
        String::from_utf8(buf).map_err(|e| DomainError::Metrics(e.to_string()))
    }
}

pub fn rcode_label(code: ResponseCode) -> Cow<'static, str> {
    match code {
        ResponseCode::NoError => Cow::Borrowed("NOERROR"),
        ResponseCode::NXDomain => Cow::Borrowed("NXDOMAIN"),
        ResponseCode::ServFail => Cow::Borrowed("SERVFAIL"),
        ResponseCode::Refused => Cow::Borrowed("REFUSED"),
        ResponseCode::NotImp => Cow::Borrowed("NOTIMP"),
        ResponseCode::FormErr => Cow::Borrowed("FORMERR"),
        other => Cow::Owned(u16::from(other).to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_by_pool_and_rcode() {
        let metrics = RelayMetrics::new().unwrap();
        metrics.observe_exchange("a", Duration::from_millis(3), Some(ResponseCode::NoError));
        metrics.observe_exchange("a", Duration::from_millis(3), Some(ResponseCode::NoError));
        metrics.observe_exchange("a", Duration::from_millis(9), None);
        metrics.observe_exchange("b", Duration::from_millis(1), Some(ResponseCode::NXDomain));

        assert_eq!(metrics.response_count("a", "NOERROR"), 2);
        assert_eq!(metrics.response_count("a", "error"), 1);
        assert_eq!(metrics.response_count("b", "NXDOMAIN"), 1);
        assert_eq!(metrics.latency_sample_count("a"), 3);
    }

    #[test]
    fn unnamed_rcodes_use_numeric_label() {
        assert_eq!(rcode_label(ResponseCode::YXDomain), "6");
        assert_eq!(rcode_label(ResponseCode::Refused), "REFUSED");
    }

    #[test]
    fn export_renders_text_format() {
        let metrics = RelayMetrics::new().unwrap();
        metrics.observe_exchange("a", Duration::from_millis(2), Some(ResponseCode::ServFail));

        let text = metrics.export().unwrap();
        assert!(text.contains("ferrous_relay_client_responses_total"));
        assert!(text.contains("rcode=\"SERVFAIL\""));
        assert!(text.contains("ferrous_relay_client_pool_latency_seconds_bucket"));
    }

    #[test]
    fn registries_are_independent() {
        let first = RelayMetrics::new().unwrap();
        let second = RelayMetrics::new().unwrap();
        first.observe_exchange("a", Duration::ZERO, None);
        assert_eq!(second.response_count("a", "error"), 0);
    }
}
