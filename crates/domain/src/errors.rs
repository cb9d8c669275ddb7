use thiserror::Error;

/// Runtime failures on the query path. Configuration problems live in
/// [`crate::ConfigError`] and never reach this type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Transport timeout talking to {server}")]
    TransportTimeout { server: String },

    #[error("Transport connection refused by {server}: {reason}")]
    TransportConnectionRefused { server: String, reason: String },

    #[error("Transport connection reset by {server}")]
    TransportConnectionReset { server: String },

    #[error("Transport I/O error with {server}: {reason}")]
    TransportIo { server: String, reason: String },

    #[error("TLS handshake with {server} failed: {reason}")]
    TlsHandshake { server: String, reason: String },

    #[error("Invalid TLS server name '{0}'")]
    InvalidServerName(String),

    #[error("Failed to resolve upstream {server}: {reason}")]
    Resolution { server: String, reason: String },

    #[error("Too many in-flight queries to {server}")]
    TooManyInflight { server: String },

    #[error("Malformed DNS message from {server}: {reason}")]
    MalformedResponse { server: String, reason: String },

    #[error("Failed to encode DNS message: {0}")]
    Encode(String),

    #[error("Failed to write response to requester: {0}")]
    ResponseWrite(String),

    #[error("Metrics error: {0}")]
    Metrics(String),

    #[error("Shutting down")]
    ShuttingDown,
}
