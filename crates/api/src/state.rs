use ferrous_relay_application::ports::{MetricsExporter, UpstreamHealthPort};
use std::sync::Arc;

#[derive(Clone)]
pub struct AdminState {
    pub metrics: Arc<dyn MetricsExporter>,
    pub upstreams: Arc<dyn UpstreamHealthPort>,
}

impl AdminState {
    pub fn new(metrics: Arc<dyn MetricsExporter>, upstreams: Arc<dyn UpstreamHealthPort>) -> Self {
        Self { metrics, upstreams }
    }
}
