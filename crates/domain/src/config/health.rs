use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HealthCheckConfig {
    /// Question name of the synthetic probe (type A).
    #[serde(default = "default_check_name")]
    pub check_name: String,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Seconds between probes.
    #[serde(default = "default_interval")]
    pub interval: u64,

    #[serde(default = "default_success_threshold")]
    pub success_threshold: u32,

    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,
}

impl HealthCheckConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            check_name: default_check_name(),
            timeout_ms: default_timeout_ms(),
            interval: default_interval(),
            success_threshold: default_success_threshold(),
            failure_threshold: default_failure_threshold(),
        }
    }
}

fn default_check_name() -> String {
    ".".to_string()
}

fn default_timeout_ms() -> u64 {
    2000
}

fn default_interval() -> u64 {
    30
}

fn default_success_threshold() -> u32 {
    2
}

fn default_failure_threshold() -> u32 {
    3
}
