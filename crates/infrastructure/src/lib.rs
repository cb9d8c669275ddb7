//! Ferrous Relay Infrastructure Layer
pub mod dns;
pub mod metrics;
