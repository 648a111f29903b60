use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Envelope returned by every resource operation, successful or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
    pub status_code: u16,
}

impl Outcome {
    pub fn success(message: impl Into<String>, data: Value, status_code: u16) -> Self {
        let message = message.into();
        tracing::info!("{}", message);
        Self {
            success: true,
            message,
            data: Some(data),
            error: None,
            status_code,
        }
    }

    pub fn ok(message: impl Into<String>) -> Self {
        Self::success(message, json!([]), 200)
    }

    pub fn failure(message: impl Into<String>, error: Value, status_code: u16) -> Self {
        let message = message.into();
        tracing::error!("{}", message);
        Self {
            success: false,
            message,
            data: None,
            error: Some(error),
            status_code,
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }
}
