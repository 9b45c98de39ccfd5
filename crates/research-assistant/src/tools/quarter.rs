//! Most recent quarter tool

use async_trait::async_trait;
use research_tools::{Result as ToolResult, Tool};
use serde_json::{Value, json};

use crate::analytics::current_quarter;

/// Reports the last fully closed calendar quarter, e.g. `2024Q4`
pub struct MostRecentQuarterTool;

#[async_trait]
impl Tool for MostRecentQuarterTool {
    async fn execute(&self, _params: Value) -> ToolResult<Value> {
        Ok(json!({ "quarter": current_quarter() }))
    }

    fn name(&self) -> &str {
        "get_most_recent_quarter"
    }

    fn description(&self) -> &str {
        "Return the most recently closed quarter as YYYYQn, the default quarter for \
         earnings call lookups."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {}
        })
    }
}
