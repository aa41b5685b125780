use serde::{Deserialize, Serialize};

use crate::constants::Action;

/// Request body sent to the backend endpoint.
///
/// The action parameters are flattened next to the `action` field, so a
/// request serializes as `{"action": "...", "key": "...", ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest<T> {
    pub action: Action,
    #[serde(flatten)]
    pub params: T,
}

impl<T: Serialize> ActionRequest<T> {
    /// Wraps `params` for the given action.
    pub fn new(action: Action, params: T) -> Self {
        Self { action, params }
    }

    /// Serializes the request into a JSON value.
    pub fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// Body returned by the backend on a non-2xx response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ErrorBody {
    /// Extracts the error message from a raw response body.
    ///
    /// Returns `None` when the body is not JSON or carries no usable `error`.
    pub fn message_from_slice(body: &[u8]) -> Option<String> {
        let parsed: ErrorBody = serde_json::from_slice(body).ok()?;
        parsed.error.filter(|msg| !msg.is_empty())
    }
}
