use std::time::Duration;

use thiserror::Error;

/// Common result type used across the SDK.
pub type Result<T> = std::result::Result<T, AvsError>;

/// Unified error enum surfaced by all public APIs.
///
/// The first four variants classify failures reported by the server; the rest
/// are raised locally before or around a request.
#[derive(Error, Debug)]
pub enum AvsError {
    /// Server or node not reachable right now. Only poll loops retry this.
    #[error("server unavailable: {0}")]
    Unavailable(String),
    /// Resource does not exist (or its status is not published yet).
    #[error("not found: {0}")]
    NotFound(String),
    /// A wait loop ran past its deadline.
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    /// Any other server status. Never retried.
    #[error("server error ({code:?}): {message}")]
    Server { code: tonic::Code, message: String },
    #[error("connection error: {0}")]
    Connection(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("operation cancelled")]
    Cancelled,
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AvsError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, AvsError::Unavailable(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AvsError::NotFound(_))
    }

    /// gRPC status code equivalent, for errors that came off the wire.
    pub fn code(&self) -> Option<tonic::Code> {
        match self {
            AvsError::Unavailable(_) => Some(tonic::Code::Unavailable),
            AvsError::NotFound(_) => Some(tonic::Code::NotFound),
            AvsError::Server { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<tonic::Status> for AvsError {
    fn from(status: tonic::Status) -> Self {
        match status.code() {
            tonic::Code::Unavailable => AvsError::Unavailable(status.message().to_string()),
            tonic::Code::NotFound => AvsError::NotFound(status.message().to_string()),
            code => AvsError::Server {
                code,
                message: status.message().to_string(),
            },
        }
    }
}

impl From<tonic::transport::Error> for AvsError {
    fn from(value: tonic::transport::Error) -> Self {
        AvsError::Connection(value.to_string())
    }
}
