mod relay_metrics;

pub use relay_metrics::{rcode_label, RelayMetrics};
