//! Persistence backends for trigger records.
//!
//! Two interchangeable implementations share the [`TriggerBackend`] contract:
//! - [`SqliteTriggerBackend`]: durable embedded key-value table, one row per trigger
//! - [`FlatFileTriggerBackend`]: one encoded record per line in a text file
//!
//! Both behave as an upsert store keyed by trigger text. Uniqueness of triggers
//! is enforced by [`crate::TriggerService`], not here.

mod flat_file;
mod sqlite;

pub use flat_file::FlatFileTriggerBackend;
pub use sqlite::SqliteTriggerBackend;

use crate::config::{BackendKind, StoreConfig};
use crate::error::ParrotResult;
use crate::types::TriggerRecord;

/// Trait for trigger record storage.
#[cfg_attr(test, mockall::automock)]
pub trait TriggerBackend: Send + Sync {
    /// Store a record, replacing any record with the same trigger.
    fn put(&self, record: &TriggerRecord) -> ParrotResult<()>;

    /// Remove the record for a trigger. Absent triggers are not an error.
    fn delete(&self, trigger: &str) -> ParrotResult<()>;

    /// Look up a single record by exact trigger text.
    fn get(&self, trigger: &str) -> ParrotResult<Option<TriggerRecord>>;

    /// Every stored record, in the backend's natural order.
    ///
    /// Entries that cannot be decoded are logged and skipped.
    fn scan_all(&self) -> ParrotResult<Vec<TriggerRecord>>;

    /// Short backend name for logs.
    fn name(&self) -> &'static str;
}

/// Open the backend selected by the configuration.
pub fn open_backend(config: &StoreConfig) -> ParrotResult<Box<dyn TriggerBackend>> {
    let path = config.resolved_path();
    tracing::info!(backend = %config.backend, path = %path.display(), "Opening trigger store");

    let backend: Box<dyn TriggerBackend> = match config.backend {
        BackendKind::Sqlite => Box::new(SqliteTriggerBackend::new(&path)?),
        BackendKind::FlatFile => Box::new(FlatFileTriggerBackend::new(&path)?),
    };
    Ok(backend)
}
