use ferrous_relay_domain::DomainError;

/// Port for rendering collected metrics in a scrape-friendly text format.
pub trait MetricsExporter: Send + Sync {
    fn export(&self) -> Result<String, DomainError>;
}
