//! Append-only mutation journal.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use fs2::FileExt;
use serde::{Deserialize, Serialize};

use folio_core::Result;
use folio_core::error::{Error, StoreError};

/// One line of `journal.jsonl`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// RFC 3339 timestamp.
    pub time: String,
    pub op: JournalOp,
    pub collection: String,
    pub id: String,
}

/// The kind of mutation recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalOp {
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone)]
pub(crate) struct Journal {
    path: PathBuf,
    lock_path: PathBuf,
}

impl Journal {
    pub(crate) fn new(root: &Path) -> Self {
        Self {
            path: root.join("journal.jsonl"),
            lock_path: root.join("journal.lock"),
        }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry per id, holding the journal lock for the whole write.
    pub(crate) fn append<'a>(
        &self,
        op: JournalOp,
        collection: &str,
        ids: impl IntoIterator<Item = &'a str>,
    ) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&self.lock_path)?;
        lock_file.lock_exclusive()?;

        let time = Utc::now().to_rfc3339();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        for id in ids {
            let entry = JournalEntry {
                time: time.clone(),
                op,
                collection: collection.to_string(),
                id: id.to_string(),
            };
            let line = serde_json::to_string(&entry).map_err(|e| {
                Error::StoreUnavailable(StoreError::Corrupt {
                    message: e.to_string(),
                })
            })?;
            writeln!(file, "{}", line)?;
        }
        file.sync_data()?;

        lock_file.unlock()?;
        Ok(())
    }

    /// Read every entry. A missing journal is empty.
    pub(crate) fn read(&self) -> Result<Vec<JournalEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(File::open(&self.path)?);
        let mut entries = Vec::new();
        for (n, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let entry = serde_json::from_str(&line).map_err(|e| {
                Error::StoreUnavailable(StoreError::Corrupt {
                    message: format!("{} line {}: {}", self.path.display(), n + 1, e),
                })
            })?;
            entries.push(entry);
        }
        Ok(entries)
    }
}
