// Tool trait and registry

use crate::protocol::ToolSchema;
use crate::schema::{derive_schema, SchemaError, ToolSpec};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;

/// A callable tool exposed over the protocol.
///
/// `spec()` supplies the registration-time descriptor the schema is derived
/// from; `call()` receives the raw `arguments` object from a tools/call
/// request and binds it to the tool's declared parameters itself (see
/// [`bind_arguments`]).
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    fn spec(&self) -> ToolSpec;

    async fn call(&self, arguments: serde_json::Value) -> Result<serde_json::Value, ToolError>;
}

/// Failure modes of a tool invocation
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// The arguments object did not bind to the tool's declared parameters
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// The tool body failed
    #[error(transparent)]
    Execution(#[from] anyhow::Error),
}

/// Decode the untyped arguments object into the tool's typed parameters.
/// Binding failures map to the invalid-params error code at the dispatch
/// boundary.
pub fn bind_arguments<T: DeserializeOwned>(
    tool_name: &str,
    arguments: serde_json::Value,
) -> Result<T, ToolError> {
    serde_json::from_value(arguments).map_err(|e| {
        ToolError::InvalidArguments(format!("Invalid arguments for {}: {}", tool_name, e))
    })
}

/// Errors raised during tool registration. Registration happens once at
/// process startup for a fixed set of tools, so these abort startup.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Tool '{0}' is already registered")]
    DuplicateTool(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

struct RegisteredTool {
    schema: ToolSchema,
    tool: Arc<dyn Tool>,
}

/// Registry of available tools, keyed by derived tool name.
///
/// Registration order is preserved: tools/list reports schemas in the order
/// tools were registered. The registry is append-only and becomes read-only
/// once the dispatcher takes ownership.
#[derive(Default)]
pub struct ToolRegistry {
    entries: Vec<RegisteredTool>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Register a tool, deriving its schema from the tool's descriptor
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), RegistryError> {
        let schema = derive_schema(&tool.spec())?;
        if self.index.contains_key(&schema.name) {
            return Err(RegistryError::DuplicateTool(schema.name));
        }

        tracing::debug!("Registered tool {}", schema.name);
        self.index.insert(schema.name.clone(), self.entries.len());
        self.entries.push(RegisteredTool { schema, tool });
        Ok(())
    }

    /// Look up a tool implementation by its derived name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.index
            .get(name)
            .map(|&i| Arc::clone(&self.entries[i].tool))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// All tool schemas in registration order
    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.entries.iter().map(|e| e.schema.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
