//! In-memory index of known trigger strings.

use tracing::debug;

use crate::backend::TriggerBackend;
use crate::error::ParrotResult;

/// Ordered list of the triggers currently in the backend.
///
/// The index is a derived view: it is rebuilt from a full scan after every
/// mutation and never patched incrementally. The backend stays the source of
/// truth, so the index can be dropped and rebuilt at any time.
#[derive(Debug, Default, Clone)]
pub struct TriggerIndex {
    triggers: Vec<String>,
}

impl TriggerIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cached triggers with a fresh scan of the backend.
    ///
    /// On failure the previous contents are kept.
    pub fn refresh(&mut self, backend: &dyn TriggerBackend) -> ParrotResult<usize> {
        let triggers: Vec<String> = backend
            .scan_all()?
            .into_iter()
            .map(|record| record.trigger)
            .collect();

        debug!(backend = backend.name(), count = triggers.len(), "Refreshed trigger index");
        self.triggers = triggers;
        Ok(self.triggers.len())
    }

    /// Exact-string membership test.
    pub fn contains(&self, trigger: &str) -> bool {
        self.triggers.iter().any(|t| t == trigger)
    }

    /// The cached triggers, in backend scan order.
    pub fn snapshot(&self) -> Vec<String> {
        self.triggers.clone()
    }

    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{MockTriggerBackend, SqliteTriggerBackend};
    use crate::error::ParrotError;
    use crate::types::TriggerRecord;

    #[test]
    fn test_refresh_and_contains() {
        let backend = SqliteTriggerBackend::in_memory().unwrap();
        backend.put(&TriggerRecord::text("cat", "meow").unwrap()).unwrap();
        backend.put(&TriggerRecord::text("dog", "woof").unwrap()).unwrap();

        let mut index = TriggerIndex::new();
        assert!(index.is_empty());

        let count = index.refresh(&backend).unwrap();
        assert_eq!(count, 2);
        assert!(index.contains("cat"));
        assert!(index.contains("dog"));
        assert!(!index.contains("ca"));
        assert_eq!(index.snapshot(), vec!["cat".to_string(), "dog".to_string()]);
    }

    #[test]
    fn test_refresh_replaces_contents() {
        let backend = SqliteTriggerBackend::in_memory().unwrap();
        backend.put(&TriggerRecord::text("cat", "meow").unwrap()).unwrap();

        let mut index = TriggerIndex::new();
        index.refresh(&backend).unwrap();

        backend.delete("cat").unwrap();
        assert!(index.contains("cat"), "index is stale until refreshed");

        index.refresh(&backend).unwrap();
        assert!(!index.contains("cat"));
        assert_eq!(index.len(), 0);
    }

    #[test]
    fn test_failed_refresh_keeps_previous_contents() {
        let mut backend = MockTriggerBackend::new();
        let mut calls = 0;
        backend.expect_scan_all().times(2).returning(move || {
            calls += 1;
            if calls == 1 {
                Ok(vec![TriggerRecord::text("cat", "meow").unwrap()])
            } else {
                Err(ParrotError::Io(std::io::Error::other("disk gone")))
            }
        });
        backend.expect_name().return_const("mock");

        let mut index = TriggerIndex::new();
        index.refresh(&backend).unwrap();
        assert!(index.refresh(&backend).is_err());
        assert!(index.contains("cat"));
    }
}
