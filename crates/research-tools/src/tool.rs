//! Tool trait definition

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use crate::Result;

/// Trait for tools an orchestrator can execute
///
/// Each tool provides a name, a description and a JSON schema for its input.
/// Callers that need the "never fail" contract should use [`Tool::call`],
/// which folds errors into the uniform error payload.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Execute the tool with given parameters
    ///
    /// # Arguments
    ///
    /// * `params` - Tool input as JSON value (should match input_schema)
    async fn execute(&self, params: Value) -> Result<Value>;

    /// Get the tool's name
    ///
    /// Must be unique within a ToolRegistry
    fn name(&self) -> &str;

    /// Get the tool's description
    fn description(&self) -> &str;

    /// Get the tool's input schema (JSON Schema format)
    ///
    /// # Example
    ///
    /// ```
    /// use serde_json::json;
    ///
    /// let schema = json!({
    ///     "type": "object",
    ///     "properties": {
    ///         "ticker": { "type": "string" },
    ///         "period": { "type": "integer", "default": 14 }
    ///     },
    ///     "required": ["ticker"]
    /// });
    /// ```
    fn input_schema(&self) -> Value;

    /// Execute and render the outcome as a JSON string.
    ///
    /// Success objects are returned verbatim; any error becomes
    /// `{"error": "..."}`.
    async fn call(&self, params: Value) -> String {
        let value = match self.execute(params).await {
            Ok(value) => value,
            Err(err) => {
                warn!(tool = self.name(), error = %err, "tool returned an error payload");
                err.to_payload().to_json()
            }
        };
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use serde_json::json;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        async fn execute(&self, params: Value) -> Result<Value> {
            match params.get("fail").and_then(Value::as_bool) {
                Some(true) => Err(Error::failed("asked to fail")),
                _ => Ok(json!({ "echo": params })),
            }
        }

        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echo the parameters back"
        }

        fn input_schema(&self) -> Value {
            json!({ "type": "object" })
        }
    }

    #[tokio::test]
    async fn test_call_success() {
        let out = EchoTool.call(json!({"a": 1})).await;
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["echo"]["a"], 1);
    }

    #[tokio::test]
    async fn test_call_error_payload() {
        let out = EchoTool.call(json!({"fail": true})).await;
        assert_eq!(out, r#"{"error":"asked to fail"}"#);
    }
}
