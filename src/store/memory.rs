//! In-memory result store.
//!
//! Data is lost on process restart. Snapshots are kept serialized so that a
//! load goes through the same JSON schema as the file store.

use super::ResultStore;
use crate::record::ResultRecord;
use crate::{Error, Result};

/// In-memory store holding the latest serialized snapshot.
///
/// Useful for tests and dry runs; [`persist_count`](Self::persist_count)
/// exposes how many snapshots were written.
#[derive(Debug, Default)]
pub struct MemoryResultStore {
    snapshot: Option<String>,
    persist_count: usize,
    fail_after: Option<usize>,
}

impl MemoryResultStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store whose writes start failing after `writes` successful ones.
    #[must_use]
    pub fn failing_after(writes: usize) -> Self {
        Self {
            fail_after: Some(writes),
            ..Self::default()
        }
    }

    /// Number of successful snapshots written.
    #[must_use]
    pub const fn persist_count(&self) -> usize {
        self.persist_count
    }

    /// Raw JSON of the latest snapshot.
    #[must_use]
    pub fn snapshot_json(&self) -> Option<&str> {
        self.snapshot.as_deref()
    }
}

impl ResultStore for MemoryResultStore {
    fn persist(&mut self, record: &ResultRecord) -> Result<()> {
        if self.fail_after.is_some_and(|limit| self.persist_count >= limit) {
            return Err(Error::Persistence(format!(
                "memory store refused write #{}",
                self.persist_count + 1
            )));
        }
        self.snapshot = Some(serde_json::to_string(record)?);
        self.persist_count += 1;
        Ok(())
    }

    fn load(&self) -> Result<Option<ResultRecord>> {
        self.snapshot
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(Error::from)
    }
}
