//! Error types for node communication

use emoney_core::ErrorKind;

/// Result type
pub type Result<T> = std::result::Result<T, Error>;

/// Error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Offline pipeline error (derivation, validation, signing, encoding)
    #[error(transparent)]
    Core(#[from] emoney_core::Error),

    /// Queried entity does not exist on chain
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed or unexpected response from a node
    #[error("Transport error: {0}")]
    Transport(String),

    /// Connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// JSON-RPC or gateway error object returned by a node
    #[error("RPC error {code}: {message}")]
    Rpc {
        /// Error code reported by the node
        code: i64,
        /// Error message reported by the node
        message: String,
    },

    /// gRPC status error
    #[error("Status error: {0}")]
    Status(tonic::Status),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Target height not reached in time
    #[error("Timed out waiting for height {target} (last observed: {last_observed:?})")]
    Timeout {
        /// Height that was awaited
        target: u64,
        /// Last height returned by the node, if any query succeeded
        last_observed: Option<u64>,
    },

    /// Operation cancelled
    #[error("Cancelled")]
    Cancelled,

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<tonic::Status> for Error {
    fn from(status: tonic::Status) -> Self {
        if status.code() == tonic::Code::NotFound {
            Error::NotFound(status.message().to_string())
        } else {
            Error::Status(status)
        }
    }
}

impl From<tonic::transport::Error> for Error {
    fn from(e: tonic::transport::Error) -> Self {
        Error::Connection(e.to_string())
    }
}

impl From<prost::DecodeError> for Error {
    fn from(e: prost::DecodeError) -> Self {
        Error::Transport(format!("protobuf decode failed: {e}"))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Transport(format!("JSON decode failed: {e}"))
    }
}

impl Error {
    /// Get error kind for branching and logging
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Core(e) => e.kind(),
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::Transport(_)
            | Error::Connection(_)
            | Error::Rpc { .. }
            | Error::Status(_)
            | Error::Http(_) => ErrorKind::Transport,
            Error::Timeout { .. } => ErrorKind::Timeout,
            Error::Cancelled => ErrorKind::Cancelled,
            Error::Config(_) => ErrorKind::Validation,
        }
    }

    /// Whether the caller may retry the same request.
    ///
    /// Only transport failures qualify. Broadcasts are never retried
    /// internally; resubmitting with a stale sequence is the caller's call.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grpc_not_found_maps_to_not_found() {
        let err: Error = tonic::Status::not_found("account emoney1x not found").into();
        assert!(matches!(err, Error::NotFound(ref m) if m.contains("emoney1x")));
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(!err.is_retryable());

        let err: Error = tonic::Status::unavailable("down").into();
        assert!(matches!(err, Error::Status(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_core_kinds_pass_through() {
        let err: Error = emoney_core::Error::missing_keys().into();
        assert_eq!(err.kind(), ErrorKind::Signing);
        let err: Error = emoney_core::Error::EmptyMessages.into();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_timeout_display() {
        let err = Error::Timeout {
            target: 10,
            last_observed: Some(9),
        };
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert_eq!(
            err.to_string(),
            "Timed out waiting for height 10 (last observed: Some(9))"
        );
    }
}
