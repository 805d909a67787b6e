use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use toolgate_mcp::{Tool, ToolError, ToolSpec};

/// Tool returning the current UTC time
pub struct GetTimeTool;

#[async_trait::async_trait]
impl Tool for GetTimeTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec::new("get_time", "Get the current UTC time in ISO format.")
    }

    async fn call(&self, _arguments: Value) -> Result<Value, ToolError> {
        Ok(Value::String(
            Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false),
        ))
    }
}
