//! Durable result snapshots
//!
//! Every discrete unit of sweep work ends with a full snapshot of the
//! [`ResultRecord`]. Stores are last-write-wins and keep no history.
//!
//! # Example
//!
//! ```rust
//! use sweepstat::record::ResultRecord;
//! use sweepstat::store::{MemoryResultStore, ResultStore};
//!
//! let mut store = MemoryResultStore::new();
//! assert!(store.load()?.is_none());
//!
//! let record = ResultRecord::new("cpu", vec![42], 100);
//! store.persist(&record)?;
//! assert_eq!(store.load()?, Some(record));
//! # Ok::<(), sweepstat::Error>(())
//! ```

mod json_file;
mod memory;

pub use json_file::{JsonFileStore, DEFAULT_FILE_NAME};
pub use memory::MemoryResultStore;

use crate::record::ResultRecord;
use crate::Result;

/// Snapshot persistence for a [`ResultRecord`].
pub trait ResultStore {
    /// Overwrite the stored snapshot with `record`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Persistence`](crate::Error::Persistence) if the write
    /// is not durable. Callers must treat this as fatal.
    fn persist(&mut self, record: &ResultRecord) -> Result<()>;

    /// Load the last snapshot, or `None` if nothing was persisted yet.
    ///
    /// # Errors
    ///
    /// Returns error if a snapshot exists but cannot be read or decoded
    fn load(&self) -> Result<Option<ResultRecord>>;
}

impl<S: ResultStore + ?Sized> ResultStore for Box<S> {
    fn persist(&mut self, record: &ResultRecord) -> Result<()> {
        (**self).persist(record)
    }

    fn load(&self) -> Result<Option<ResultRecord>> {
        (**self).load()
    }
}
