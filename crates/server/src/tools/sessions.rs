use serde_json::{json, Value};
use std::sync::Arc;
use toolgate_core::SessionStore;
use toolgate_mcp::{Tool, ToolError, ToolSpec};

/// Tool reporting the number of live sessions in the session store
pub struct CountSessionsTool {
    sessions: Arc<dyn SessionStore>,
}

impl CountSessionsTool {
    pub fn new(sessions: Arc<dyn SessionStore>) -> Self {
        Self { sessions }
    }
}

#[async_trait::async_trait]
impl Tool for CountSessionsTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec::new("count_sessions", "Count the number of live sessions.")
    }

    async fn call(&self, _arguments: Value) -> Result<Value, ToolError> {
        let count = self.sessions.count_sessions()?;
        Ok(json!(count))
    }
}
