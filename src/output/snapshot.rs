//! JSON snapshot persistence
//!
//! Every artifact is a pretty-printed JSON array of thread records, so a
//! partial checkpoint, the final output, and a crash-recovery snapshot all
//! share one format.

use crate::state::ThreadRecord;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while writing snapshots
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to serialize snapshot: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for snapshot operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Writes run artifacts under a directory with a common file prefix
///
/// * partial checkpoints: `<prefix>_partial_<n>.json`
/// * final output: `<prefix>_full.json`
/// * crash recovery: `<prefix>_recovery.json`
#[derive(Debug, Clone)]
pub struct Checkpointer {
    directory: PathBuf,
    prefix: String,
}

impl Checkpointer {
    pub fn new(directory: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            prefix: prefix.into(),
        }
    }

    /// Persists a mid-run checkpoint; `processed` makes the name unique
    pub fn save_partial(&self, processed: u32, records: &[ThreadRecord]) -> OutputResult<PathBuf> {
        self.save(format!("{}_partial_{}.json", self.prefix, processed), records)
    }

    /// Persists the final output of a completed run
    pub fn save_full(&self, records: &[ThreadRecord]) -> OutputResult<PathBuf> {
        self.save(format!("{}_full.json", self.prefix), records)
    }

    /// Persists whatever accumulated before a run died
    pub fn save_recovery(&self, records: &[ThreadRecord]) -> OutputResult<PathBuf> {
        self.save(format!("{}_recovery.json", self.prefix), records)
    }

    fn save(&self, file_name: String, records: &[ThreadRecord]) -> OutputResult<PathBuf> {
        fs::create_dir_all(&self.directory)?;

        let path = self.directory.join(file_name);
        let json = serde_json::to_string_pretty(records)?;
        fs::write(&path, json)?;

        debug!("wrote {} record(s) to {}", records.len(), path.display());
        Ok(path)
    }
}
