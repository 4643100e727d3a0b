//! Layered error definitions
//!
//! Categorized by source: config / stream collaborator / transport

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ProducerError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Stream Collaborator Errors =====
    /// Write capacity exceeded for the whole batch (retryable)
    #[error("throughput exceeded for stream '{stream}'")]
    ThroughputExceeded { stream: String },

    /// Target stream does not exist
    #[error("stream not found: {stream}")]
    StreamNotFound { stream: String },

    /// Caller is not authorized to write to the stream
    #[error("access denied: {message}")]
    AccessDenied { message: String },

    /// Response results do not line up with submitted records
    #[error("malformed response: expected {expected} record results, got {got}")]
    MalformedResponse { expected: usize, got: usize },

    // ===== Transport Errors =====
    /// Connection error
    #[error("connection error: {message}")]
    Connection { message: String },

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ProducerError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create whole-batch throughput rejection
    pub fn throughput_exceeded(stream: impl Into<String>) -> Self {
        Self::ThroughputExceeded {
            stream: stream.into(),
        }
    }

    /// Create connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Whether this error is the batch-level throughput rejection.
    ///
    /// The dispatcher retries on this condition and aborts on everything else.
    pub fn is_throughput_exceeded(&self) -> bool {
        matches!(self, Self::ThroughputExceeded { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throughput_exceeded_predicate() {
        assert!(ProducerError::throughput_exceeded("orders").is_throughput_exceeded());
        assert!(!ProducerError::connection("refused").is_throughput_exceeded());
        assert!(!ProducerError::StreamNotFound {
            stream: "orders".into()
        }
        .is_throughput_exceeded());
    }
}
