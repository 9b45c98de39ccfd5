//! Error types for tool execution

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

/// Result type alias for tool execution
pub type Result<T> = std::result::Result<T, Error>;

/// Error returned by a tool's `execute`
#[derive(Error, Debug)]
pub enum Error {
    /// Parameters did not match the tool's input schema
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// Tool ran but could not produce a result
    #[error("{message}")]
    Failed {
        message: String,
        /// Unparsed downstream text, when a secondary parse step failed
        raw_output: Option<String>,
    },
}

impl Error {
    /// Create a failure without raw output
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
            raw_output: None,
        }
    }

    /// Build the payload returned to the caller in place of a result
    pub fn to_payload(&self) -> ErrorPayload {
        match self {
            Self::Failed {
                message,
                raw_output,
            } => ErrorPayload {
                error: message.clone(),
                raw_output: raw_output.clone(),
            },
            other => ErrorPayload {
                error: other.to_string(),
                raw_output: None,
            },
        }
    }
}

/// Uniform failure shape: `{"error": "<message>"}` with optional `raw_output`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_output: Option<String>,
}

impl ErrorPayload {
    /// Render the payload as a JSON value
    pub fn to_json(&self) -> Value {
        match &self.raw_output {
            Some(raw) => json!({ "error": self.error, "raw_output": raw }),
            None => json!({ "error": self.error }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_payload() {
        let payload = Error::failed("No data").to_payload();
        assert_eq!(payload.to_json(), json!({"error": "No data"}));
    }

    #[test]
    fn test_raw_output_kept() {
        let err = Error::Failed {
            message: "Model output could not be parsed as JSON.".to_string(),
            raw_output: Some("not json".to_string()),
        };
        let value = err.to_payload().to_json();
        assert_eq!(value["raw_output"], "not json");
        assert_eq!(value["error"], "Model output could not be parsed as JSON.");
    }

    #[test]
    fn test_invalid_parameters_message() {
        let err = Error::InvalidParameters("missing field `ticker`".to_string());
        assert_eq!(
            err.to_payload().error,
            "Invalid parameters: missing field `ticker`"
        );
    }
}
