//! Trigger service: save, delete, list and reply lookup over one backend.

use std::sync::{Mutex, MutexGuard};

use tracing::{debug, error, info};

use crate::backend::{open_backend, TriggerBackend};
use crate::cache::TriggerIndex;
use crate::config::StoreConfig;
use crate::error::{ParrotError, ParrotResult};
use crate::matcher;
use crate::types::{validate_trigger, MediaKind, TriggerRecord};

/// Facade over a persistence backend and its trigger index.
///
/// The index mutex is held across every `{mutate backend, refresh index}`
/// sequence, so the service can be shared between threads even though the
/// bot drives it from a single dispatch loop.
pub struct TriggerService {
    backend: Box<dyn TriggerBackend>,
    index: Mutex<TriggerIndex>,
}

impl TriggerService {
    /// Create a service over the given backend and load its index.
    pub fn new(backend: Box<dyn TriggerBackend>) -> ParrotResult<Self> {
        let mut index = TriggerIndex::new();
        let count = index.refresh(backend.as_ref())?;
        info!(backend = backend.name(), triggers = count, "Trigger service ready");

        Ok(Self {
            backend,
            index: Mutex::new(index),
        })
    }

    /// Open the configured backend and create a service over it.
    pub fn from_config(config: &StoreConfig) -> ParrotResult<Self> {
        Self::new(open_backend(config)?)
    }

    /// Register a new trigger.
    ///
    /// Fails with [`ParrotError::AlreadyExists`] when the trigger is known.
    pub fn save(
        &self,
        trigger: &str,
        reply_text: &str,
        media_kind: MediaKind,
        media_ref: &str,
    ) -> ParrotResult<TriggerRecord> {
        let mut index = self.lock_index()?;
        if index.contains(trigger) {
            return Err(ParrotError::already_exists(trigger));
        }

        let record = TriggerRecord::new(trigger, reply_text, media_kind, media_ref)?;
        self.backend
            .put(&record)
            .map_err(|e| self.log_failure("save", trigger, e))?;
        index
            .refresh(self.backend.as_ref())
            .map_err(|e| self.log_failure("refresh after save", trigger, e))?;

        info!(trigger, media_kind = %media_kind, "Trigger saved");
        Ok(record)
    }

    /// Remove a trigger.
    ///
    /// Fails with [`ParrotError::NotFound`] when the trigger is unknown.
    pub fn delete(&self, trigger: &str) -> ParrotResult<()> {
        let mut index = self.lock_index()?;
        if !index.contains(trigger) {
            return Err(ParrotError::not_found(trigger));
        }

        self.backend
            .delete(trigger)
            .map_err(|e| self.log_failure("delete", trigger, e))?;
        index
            .refresh(self.backend.as_ref())
            .map_err(|e| self.log_failure("refresh after delete", trigger, e))?;

        info!(trigger, "Trigger deleted");
        Ok(())
    }

    /// All registered triggers, freshly read from the backend.
    pub fn list(&self) -> ParrotResult<Vec<String>> {
        let mut index = self.lock_index()?;
        index
            .refresh(self.backend.as_ref())
            .map_err(|e| self.log_failure("list", "", e))?;
        Ok(index.snapshot())
    }

    /// The record of the longest trigger contained in `text`, if any.
    pub fn find_reply(&self, text: &str) -> ParrotResult<Option<TriggerRecord>> {
        let _index = self.lock_index()?;
        let records = self
            .backend
            .scan_all()
            .map_err(|e| self.log_failure("match", "", e))?;

        let hit = matcher::find_longest_match(records, text);
        if let Some(record) = &hit {
            debug!(trigger = %record.trigger, media_kind = %record.media_kind, "Trigger matched");
        }
        Ok(hit)
    }

    /// Look up one record by exact trigger text.
    pub fn get(&self, trigger: &str) -> ParrotResult<Option<TriggerRecord>> {
        validate_trigger(trigger)?;
        let _index = self.lock_index()?;
        self.backend.get(trigger)
    }

    /// Whether the cached index knows this trigger.
    pub fn contains(&self, trigger: &str) -> ParrotResult<bool> {
        Ok(self.lock_index()?.contains(trigger))
    }

    /// Name of the active backend.
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    fn lock_index(&self) -> ParrotResult<MutexGuard<'_, TriggerIndex>> {
        self.index
            .lock()
            .map_err(|_| ParrotError::poisoned("trigger index"))
    }

    fn log_failure(&self, op: &str, trigger: &str, err: ParrotError) -> ParrotError {
        error!(
            op,
            trigger,
            backend = self.backend.name(),
            code = err.code().as_str(),
            error = %err,
            "Trigger store operation failed"
        );
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{MockTriggerBackend, SqliteTriggerBackend};
    use crate::error::ErrorCode;

    fn service() -> TriggerService {
        TriggerService::new(Box::new(SqliteTriggerBackend::in_memory().unwrap())).unwrap()
    }

    #[test]
    fn test_save_and_find() {
        let service = service();
        service.save("hi", "hello!", MediaKind::Text, "").unwrap();

        let hit = service.find_reply("oh hi there").unwrap().unwrap();
        assert_eq!(hit.reply_text, "hello!");
        assert!(service.contains("hi").unwrap());
    }

    #[test]
    fn test_save_duplicate_rejected() {
        let service = service();
        service.save("hi", "first", MediaKind::Text, "").unwrap();

        let err = service.save("hi", "second", MediaKind::Text, "").unwrap_err();
        assert!(matches!(err, ParrotError::AlreadyExists { .. }));
        assert_eq!(service.get("hi").unwrap().unwrap().reply_text, "first");
    }

    #[test]
    fn test_save_invalid_record() {
        let service = service();
        let err = service.save("a|b", "x", MediaKind::Text, "").unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValInvalidTrigger);

        let err = service.save("pic", "", MediaKind::Photo, "").unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValMissingMediaRef);
        assert!(service.list().unwrap().is_empty());
    }

    #[test]
    fn test_delete_absent() {
        let service = service();
        let err = service.delete("nope").unwrap_err();
        assert!(matches!(err, ParrotError::NotFound { .. }));
    }

    #[test]
    fn test_put_failure_leaves_index_untouched() {
        let mut backend = MockTriggerBackend::new();
        backend.expect_scan_all().times(1).returning(|| Ok(Vec::new()));
        backend
            .expect_put()
            .times(1)
            .returning(|_| Err(ParrotError::Io(std::io::Error::other("disk full"))));
        backend.expect_name().return_const("mock");

        let service = TriggerService::new(Box::new(backend)).unwrap();
        let err = service.save("x", "y", MediaKind::Text, "").unwrap_err();
        assert!(err.is_storage());
        assert!(!service.contains("x").unwrap());
    }

    #[test]
    fn test_delete_failure_leaves_index_untouched() {
        let mut backend = MockTriggerBackend::new();
        backend
            .expect_scan_all()
            .times(1)
            .returning(|| Ok(vec![TriggerRecord::text("x", "y").unwrap()]));
        backend
            .expect_delete()
            .times(1)
            .returning(|_| Err(ParrotError::database("locked")));
        backend.expect_name().return_const("mock");

        let service = TriggerService::new(Box::new(backend)).unwrap();
        assert!(service.delete("x").is_err());
        assert!(service.contains("x").unwrap());
    }

    #[test]
    fn test_match_failure_is_reported() {
        let mut backend = MockTriggerBackend::new();
        let mut calls = 0;
        backend.expect_scan_all().times(2).returning(move || {
            calls += 1;
            if calls == 1 {
                Ok(Vec::new())
            } else {
                Err(ParrotError::database("corrupt"))
            }
        });
        backend.expect_name().return_const("mock");

        let service = TriggerService::new(Box::new(backend)).unwrap();
        assert!(service.find_reply("anything").is_err());
    }
}
