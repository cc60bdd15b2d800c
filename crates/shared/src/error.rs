use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Error body the backend sends with non-success statuses.
///
/// `detail` is either a plain message or an object carrying `message` next to
/// extra fields such as `invalid_skills`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub detail: Option<Value>,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            detail: Some(Value::String(message.into())),
        }
    }

    /// Message from a string `detail` or from `detail.message`. Blank
    /// messages count as absent.
    pub fn message(&self) -> Option<String> {
        let message = match self.detail.as_ref()? {
            Value::String(s) => Some(s.as_str()),
            Value::Object(map) => map.get("message").and_then(Value::as_str),
            _ => None,
        };
        message
            .filter(|m| !m.trim().is_empty())
            .map(str::to_owned)
    }

    /// Message only when `detail` is a plain string.
    pub fn text(&self) -> Option<String> {
        self.detail
            .as_ref()
            .and_then(Value::as_str)
            .filter(|m| !m.trim().is_empty())
            .map(str::to_owned)
    }
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("response is missing field `{0}`")]
    MissingField(&'static str),
    #[error("server rejected request: {0}")]
    Rejected(String),
}
