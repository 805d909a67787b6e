// MCP (Model Context Protocol) tool server core: protocol types, schema
// derivation, tool registry, and the per-request dispatcher.

pub mod dispatch;
pub mod protocol;
pub mod schema;
pub mod tools;

pub use dispatch::{Dispatcher, GatewayRequest, GatewayResponse};
pub use schema::{derive_schema, ParamKind, ParamSpec, SchemaError, ToolSpec};
pub use tools::{bind_arguments, RegistryError, Tool, ToolError, ToolRegistry};
