//! JSON file result store.
//!
//! Snapshots are written to `<path>.tmp`, flushed, then renamed over
//! `<path>`. A crash mid-write leaves the previous snapshot intact.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::ResultStore;
use crate::record::ResultRecord;
use crate::{Error, Result};

/// File name used by [`JsonFileStore::in_dir`].
pub const DEFAULT_FILE_NAME: &str = "comprehensive_results.json";

/// Pretty-printed JSON snapshot on the local filesystem.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store snapshots at `path`.
    #[must_use]
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Store snapshots as `comprehensive_results.json` inside `dir`.
    #[must_use]
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self::new(dir.as_ref().join(DEFAULT_FILE_NAME))
    }

    /// Snapshot path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }

    fn write_atomic(&self, content: &[u8]) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let temp_path = self.temp_path();
        let written = write_synced(&temp_path, content)
            .and_then(|()| fs::rename(&temp_path, &self.path));
        if written.is_err() {
            // Best effort; the write error is what the caller needs
            let _ = fs::remove_file(&temp_path);
        }
        written
    }
}

fn write_synced(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content)?;
    file.sync_all()
}

impl ResultStore for JsonFileStore {
    fn persist(&mut self, record: &ResultRecord) -> Result<()> {
        let content = serde_json::to_vec_pretty(record)
            .map_err(|e| Error::Persistence(format!("failed to encode snapshot: {e}")))?;
        self.write_atomic(&content).map_err(|e| {
            Error::Persistence(format!(
                "failed to write snapshot {}: {e}",
                self.path.display()
            ))
        })?;
        debug!(path = %self.path.display(), bytes = content.len(), "snapshot persisted");
        Ok(())
    }

    fn load(&self) -> Result<Option<ResultRecord>> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::Io(e)),
        };
        Ok(Some(serde_json::from_slice(&raw)?))
    }
}
