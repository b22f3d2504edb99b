//! SQLite key-value backend.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};
use tracing::warn;

use crate::backend::TriggerBackend;
use crate::codec;
use crate::error::{ErrorCode, ParrotError, ParrotResult};
use crate::types::TriggerRecord;

/// SQLite-backed trigger store.
///
/// Keys are the raw trigger bytes, values the encoded record. Each mutation is a
/// single statement, so a write is atomic per key.
pub struct SqliteTriggerBackend {
    conn: Mutex<Connection>,
}

impl SqliteTriggerBackend {
    /// Open or create a store at the given path.
    pub fn new(path: impl AsRef<Path>) -> ParrotResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path).map_err(|e| ParrotError::Database {
            message: format!("failed to open {}: {}", path.display(), e),
            code: ErrorCode::DbConnectionFailed,
            source: Some(Box::new(e)),
        })?;
        Self::with_connection(conn)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> ParrotResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> ParrotResult<Self> {
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> ParrotResult<()> {
        let conn = self.conn()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS triggers (
                key BLOB PRIMARY KEY,
                value BLOB NOT NULL
            );
        "#,
        )?;
        Ok(())
    }

    fn conn(&self) -> ParrotResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| ParrotError::poisoned("sqlite connection"))
    }

    /// Decode a row, treating the key as the authoritative trigger.
    fn row_to_record(key: &[u8], value: &[u8]) -> ParrotResult<TriggerRecord> {
        let mut record = codec::decode_bytes(value)?;
        let key = std::str::from_utf8(key).map_err(|_| crate::error::DecodeError::InvalidUtf8)?;
        if record.trigger != key {
            warn!(key, stored = %record.trigger, "Stored trigger differs from its key");
            record.trigger = key.to_string();
        }
        Ok(record)
    }
}

impl TriggerBackend for SqliteTriggerBackend {
    fn put(&self, record: &TriggerRecord) -> ParrotResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO triggers (key, value) VALUES (?1, ?2)",
            params![record.trigger.as_bytes(), codec::encode_bytes(record)],
        )?;
        Ok(())
    }

    fn delete(&self, trigger: &str) -> ParrotResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "DELETE FROM triggers WHERE key = ?1",
            params![trigger.as_bytes()],
        )?;
        Ok(())
    }

    fn get(&self, trigger: &str) -> ParrotResult<Option<TriggerRecord>> {
        let conn = self.conn()?;
        let value: Option<Vec<u8>> = conn
            .query_row(
                "SELECT value FROM triggers WHERE key = ?1",
                params![trigger.as_bytes()],
                |row| row.get(0),
            )
            .optional()?;

        value
            .map(|v| Self::row_to_record(trigger.as_bytes(), &v))
            .transpose()
    }

    fn scan_all(&self) -> ParrotResult<Vec<TriggerRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT key, value FROM triggers ORDER BY key")?;
        let rows = stmt.query_map([], |row| {
            let key: Vec<u8> = row.get(0)?;
            let value: Vec<u8> = row.get(1)?;
            Ok((key, value))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (key, value) = row?;
            match Self::row_to_record(&key, &value) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(
                        key = %String::from_utf8_lossy(&key),
                        error = %e,
                        "Skipping undecodable trigger entry"
                    );
                }
            }
        }

        Ok(records)
    }

    fn name(&self) -> &'static str {
        "sqlite"
    }
}
