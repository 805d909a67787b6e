// Session management for associating client state across tool calls

use crate::types::SessionId;
use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

/// Default session lifetime: 24 hours
pub const DEFAULT_SESSION_TTL_SECS: i64 = 24 * 60 * 60;

/// A stored session: opaque data plus creation and expiry timestamps
/// (epoch seconds)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: SessionId,
    pub created_at: i64,
    pub expires_at: i64,
    pub data: serde_json::Value,
}

impl SessionRecord {
    pub fn new(ttl_secs: i64, data: serde_json::Value) -> Self {
        let now = Utc::now().timestamp();
        Self {
            session_id: SessionId::generate(),
            created_at: now,
            expires_at: now + ttl_secs,
            data,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now().timestamp()
    }
}

/// Key-value session store with time-based expiry.
///
/// Sessions are created with a fresh random identifier and live until their
/// expiry timestamp passes; expired sessions are removed lazily on read.
/// The store is not consulted by the protocol dispatcher itself -- tools
/// that want cross-call state are handed a reference at registration time.
pub trait SessionStore: Send + Sync {
    /// Create a new session, returning its identifier
    fn create_session(&self, data: Option<serde_json::Value>) -> Result<SessionId>;

    /// Get session data, or None if the session is missing or expired
    fn get_session(&self, id: &SessionId) -> Result<Option<serde_json::Value>>;

    /// Replace session data; returns false if the session does not exist
    fn update_session(&self, id: &SessionId, data: serde_json::Value) -> Result<bool>;

    /// Delete a session; returns false if the session did not exist
    fn delete_session(&self, id: &SessionId) -> Result<bool>;

    /// Number of live (unexpired) sessions
    fn count_sessions(&self) -> Result<usize>;
}

/// In-memory session store, used by tests and single-instance demos
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<SessionId, SessionRecord>>,
    ttl_secs: i64,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_SESSION_TTL_SECS)
    }

    pub fn with_ttl(ttl_secs: i64) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl_secs,
        }
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for MemorySessionStore {
    fn create_session(&self, data: Option<serde_json::Value>) -> Result<SessionId> {
        let record = SessionRecord::new(
            self.ttl_secs,
            data.unwrap_or_else(|| serde_json::json!({})),
        );
        let id = record.session_id.clone();
        self.sessions.lock().unwrap().insert(id.clone(), record);
        tracing::info!("Created session {}", id);
        Ok(id)
    }

    fn get_session(&self, id: &SessionId) -> Result<Option<serde_json::Value>> {
        let mut sessions = self.sessions.lock().unwrap();
        match sessions.get(id) {
            Some(record) if record.is_expired() => {
                sessions.remove(id);
                tracing::debug!("Session {} expired", id);
                Ok(None)
            }
            Some(record) => Ok(Some(record.data.clone())),
            None => Ok(None),
        }
    }

    fn update_session(&self, id: &SessionId, data: serde_json::Value) -> Result<bool> {
        let mut sessions = self.sessions.lock().unwrap();
        match sessions.get_mut(id) {
            Some(record) => {
                record.data = data;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete_session(&self, id: &SessionId) -> Result<bool> {
        let removed = self.sessions.lock().unwrap().remove(id).is_some();
        if removed {
            tracing::info!("Deleted session {}", id);
        }
        Ok(removed)
    }

    fn count_sessions(&self) -> Result<usize> {
        let sessions = self.sessions.lock().unwrap();
        Ok(sessions.values().filter(|r| !r.is_expired()).count())
    }
}
