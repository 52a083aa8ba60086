//! Failure taxonomy for backend calls.

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

pub const GENERIC_FAILURE: &str = "Request failed";
pub const TRANSPORT_FAILURE: &str = "Request failed: server unreachable";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{status}: {message}")]
    Status { status: StatusCode, message: String },
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// Builds a status error from a non-2xx response body.
    pub fn from_status(status: StatusCode, body: &[u8]) -> Self {
        ApiError::Status {
            status,
            message: failure_detail(body).unwrap_or_else(|| GENERIC_FAILURE.to_string()),
        }
    }

    /// Text shown to the player for this failure.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Transport(_) => TRANSPORT_FAILURE.to_string(),
            ApiError::Status { message, .. } => message.clone(),
            ApiError::Decode(_) => GENERIC_FAILURE.to_string(),
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// The `detail` field of a failure body. Non-string details are shown as JSON.
pub fn failure_detail(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    match value.get("detail")? {
        Value::String(detail) => Some(detail.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}
