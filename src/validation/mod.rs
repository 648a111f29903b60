pub mod fields;
pub mod temporal;

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Invalid value for param: {param} value: {value}")]
    InvalidParam { param: String, value: String },
    #[error("{end_label} ({end}) occurs before {start_label} ({start})")]
    OutOfOrder {
        start_label: &'static str,
        start: String,
        end_label: &'static str,
        end: String,
    },
}

impl ValidationError {
    pub fn invalid(param: &str, value: Option<&Value>) -> Self {
        Self::InvalidParam {
            param: param.to_string(),
            value: render_value(value),
        }
    }
}

/// Strings are shown bare, everything else as JSON.
pub fn render_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "null".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// A record that can be built from a JSON request body.
pub trait Payload: Sized {
    fn from_body(body: &Map<String, Value>) -> Result<Self, ValidationError>;
}
