mod registry;

pub use registry::{bind_arguments, RegistryError, Tool, ToolError, ToolRegistry};
