use crate::session::{SessionRecord, SessionStore, DEFAULT_SESSION_TTL_SECS};
use crate::types::SessionId;
use anyhow::{Context, Result};
use redb::{Database, ReadableTable, TableDefinition};
use std::path::PathBuf;
use std::sync::Arc;

const SESSIONS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("sessions");

/// Session store backed by an embedded redb database.
///
/// Records are stored as JSON-serialized [`SessionRecord`]s keyed by
/// session id. Expiry is enforced lazily: an expired record is deleted
/// the first time it is read.
#[derive(Clone)]
pub struct RedbSessionStore {
    db: Arc<Database>,
    ttl_secs: i64,
}

impl RedbSessionStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        Self::with_ttl(path, DEFAULT_SESSION_TTL_SECS)
    }

    pub fn with_ttl(path: PathBuf, ttl_secs: i64) -> Result<Self> {
        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create session store directory")?;
        }

        let db = Database::create(&path).context("Failed to create session database")?;

        // Initialize the table
        let write_txn = db.begin_write().context("Failed to begin write transaction")?;
        {
            let _table = write_txn
                .open_table(SESSIONS_TABLE)
                .context("Failed to open sessions table")?;
        }
        write_txn.commit().context("Failed to commit transaction")?;

        Ok(Self {
            db: Arc::new(db),
            ttl_secs,
        })
    }

    fn read_record(&self, id: &SessionId) -> Result<Option<SessionRecord>> {
        let read_txn = self.db.begin_read().context("Failed to begin read")?;
        let table = read_txn
            .open_table(SESSIONS_TABLE)
            .context("Failed to open table")?;

        let value = table.get(id.as_str()).context("Failed to get session")?;

        match value {
            Some(guard) => {
                let record: SessionRecord = serde_json::from_slice(guard.value())
                    .context("Failed to deserialize session")?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    fn write_record(&self, record: &SessionRecord) -> Result<()> {
        let write_txn = self.db.begin_write().context("Failed to begin write")?;
        {
            let mut table = write_txn
                .open_table(SESSIONS_TABLE)
                .context("Failed to open table")?;

            let value = serde_json::to_vec(record).context("Failed to serialize session")?;
            table
                .insert(record.session_id.as_str(), value.as_slice())
                .context("Failed to insert session")?;
        }
        write_txn.commit().context("Failed to commit")?;
        Ok(())
    }

    fn remove_record(&self, id: &SessionId) -> Result<bool> {
        let write_txn = self.db.begin_write().context("Failed to begin write")?;
        let removed;
        {
            let mut table = write_txn
                .open_table(SESSIONS_TABLE)
                .context("Failed to open table")?;
            removed = table
                .remove(id.as_str())
                .context("Failed to remove session")?
                .is_some();
        }
        write_txn.commit().context("Failed to commit")?;
        Ok(removed)
    }
}

impl SessionStore for RedbSessionStore {
    fn create_session(&self, data: Option<serde_json::Value>) -> Result<SessionId> {
        let record = SessionRecord::new(
            self.ttl_secs,
            data.unwrap_or_else(|| serde_json::json!({})),
        );
        self.write_record(&record)?;
        tracing::info!("Created session {}", record.session_id);
        Ok(record.session_id)
    }

    fn get_session(&self, id: &SessionId) -> Result<Option<serde_json::Value>> {
        match self.read_record(id)? {
            Some(record) if record.is_expired() => {
                tracing::debug!("Session {} expired", id);
                self.remove_record(id)?;
                Ok(None)
            }
            Some(record) => Ok(Some(record.data)),
            None => Ok(None),
        }
    }

    fn update_session(&self, id: &SessionId, data: serde_json::Value) -> Result<bool> {
        // Expiry is left untouched; only the payload is replaced
        match self.read_record(id)? {
            Some(mut record) => {
                record.data = data;
                self.write_record(&record)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete_session(&self, id: &SessionId) -> Result<bool> {
        let removed = self.remove_record(id)?;
        if removed {
            tracing::info!("Deleted session {}", id);
        }
        Ok(removed)
    }

    fn count_sessions(&self) -> Result<usize> {
        let read_txn = self.db.begin_read().context("Failed to begin read")?;
        let table = read_txn
            .open_table(SESSIONS_TABLE)
            .context("Failed to open table")?;

        let mut count = 0;
        for entry in table.iter().context("Failed to iterate sessions")? {
            let (_, value) = entry.context("Failed to read session entry")?;
            let record: SessionRecord = serde_json::from_slice(value.value())
                .context("Failed to deserialize session")?;
            if !record.is_expired() {
                count += 1;
            }
        }
        Ok(count)
    }
}
