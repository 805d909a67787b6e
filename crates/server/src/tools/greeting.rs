use serde::Deserialize;
use serde_json::{json, Value};
use toolgate_mcp::{bind_arguments, ParamKind, Tool, ToolError, ToolSpec};

const DOC: &str = "A simple hello world tool.\n\n\
                   Args:\n    name: Name to greet\n\n\
                   Returns:\n    A greeting message";

/// Demo greeting tool
pub struct HelloWorldTool;

#[derive(Debug, Deserialize)]
struct HelloWorldArgs {
    // The implementation falls back to "World", but the schema still marks
    // the parameter required: required-ness is derived from the declaration,
    // not from the presence of a default
    #[serde(default = "default_name")]
    name: String,
}

fn default_name() -> String {
    "World".to_string()
}

#[async_trait::async_trait]
impl Tool for HelloWorldTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec::new("hello_world", DOC).param("name", ParamKind::Text)
    }

    async fn call(&self, arguments: Value) -> Result<Value, ToolError> {
        let args: HelloWorldArgs = bind_arguments("helloWorld", arguments)?;
        Ok(json!(format!("Hello, {}!", args.name)))
    }
}
