pub mod health_check;
pub mod runner;

pub use health_check::HealthCheckJob;
pub use runner::JobRunner;
