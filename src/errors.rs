//! # Service Error Types Module
//!
//! Errors raised by the natural-language consolidation service. None of them
//! escape a grocery-list build: the generator logs them and falls back to the
//! deterministic pipeline.

/// Failure modes of the consolidation service
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceError {
    /// The call did not finish within the configured timeout
    Timeout(String),
    /// Connection, TLS or body read failure
    Transport(String),
    /// The service answered with a non-success HTTP status
    Status { code: u16, body: String },
    /// The answer did not match the grocery list schema
    MalformedResponse(String),
    /// Skipped because recent calls kept failing
    CircuitOpen,
    /// The service is not usable with the current configuration
    Configuration(String),
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::Timeout(msg) => write!(f, "Timeout error: {msg}"),
            ServiceError::Transport(msg) => write!(f, "Transport error: {msg}"),
            ServiceError::Status { code, body } => write!(f, "Service returned {code}: {body}"),
            ServiceError::MalformedResponse(msg) => write!(f, "Malformed response: {msg}"),
            ServiceError::CircuitOpen => write!(f, "Circuit breaker is open"),
            ServiceError::Configuration(msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ServiceError::Timeout(err.to_string())
        } else if err.is_decode() {
            ServiceError::MalformedResponse(err.to_string())
        } else {
            ServiceError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::MalformedResponse(err.to_string())
    }
}

impl ServiceError {
    /// Whether the failure says something about the service's health
    ///
    /// Skipped calls and local misconfiguration do not count toward opening the
    /// circuit breaker.
    pub fn counts_as_failure(&self) -> bool {
        !matches!(self, ServiceError::CircuitOpen | ServiceError::Configuration(_))
    }
}
