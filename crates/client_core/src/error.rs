use std::time::Duration;

use reqwest::StatusCode;
use shared::error::{ApiError, ProtocolError};
use thiserror::Error;

pub const TIMEOUT_MESSAGE: &str =
    "Request timed out; the interview model may still be loading. Try again in 30s.";
pub const NETWORK_MESSAGE: &str = "Network error. Please try again.";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("network failure: {0}")]
    Network(#[source] reqwest::Error),
    #[error("server returned {status}")]
    Status { status: StatusCode, body: ApiError },
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{0}")]
    Validation(String),
}

impl ClientError {
    pub(crate) fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout)
        } else {
            Self::Network(err)
        }
    }

    /// The server answered and refused. Transport-level failures are not
    /// rejections.
    pub fn is_server_rejection(&self) -> bool {
        matches!(
            self,
            Self::Status { .. } | Self::Protocol(ProtocolError::Rejected(_))
        )
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Text shown to the user; `fallback` covers server errors without a
    /// usable `detail`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Timeout(_) => TIMEOUT_MESSAGE.to_string(),
            Self::Network(_) => NETWORK_MESSAGE.to_string(),
            Self::Status { body, .. } => body.message().unwrap_or_else(|| fallback.to_string()),
            Self::Protocol(ProtocolError::Rejected(msg)) => msg.clone(),
            Self::Validation(msg) => msg.clone(),
            Self::Protocol(_) | Self::Decode(_) | Self::Io { .. } => fallback.to_string(),
        }
    }
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;
