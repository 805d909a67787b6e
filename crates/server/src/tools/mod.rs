// Built-in tools registered by the server binary

pub mod clock;
pub mod greeting;
pub mod sessions;
pub mod weather;

pub use clock::GetTimeTool;
pub use greeting::HelloWorldTool;
pub use sessions::CountSessionsTool;
pub use weather::GetWeatherTool;

use std::sync::Arc;
use toolgate_core::SessionStore;
use toolgate_mcp::{RegistryError, ToolRegistry};

/// Register the built-in tool set. Invoked once at process startup;
/// a failure here aborts startup.
pub fn register_builtin_tools(
    registry: &mut ToolRegistry,
    sessions: Arc<dyn SessionStore>,
) -> Result<(), RegistryError> {
    registry.register(Arc::new(GetTimeTool))?;
    registry.register(Arc::new(GetWeatherTool))?;
    registry.register(Arc::new(HelloWorldTool))?;
    registry.register(Arc::new(CountSessionsTool::new(sessions)))?;
    Ok(())
}
