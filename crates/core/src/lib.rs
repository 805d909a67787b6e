// Core types and session storage for the Toolgate MCP server

pub mod session;
pub mod storage;
pub mod types;

pub use session::{MemorySessionStore, SessionRecord, SessionStore, DEFAULT_SESSION_TTL_SECS};
pub use storage::RedbSessionStore;
pub use types::SessionId;
