//! File-backed record store.
//!
//! The store is a JSON file holding the records this client has collected
//! from relays — a local stand-in for "whatever the fetch layer returned so
//! far". Loading is tolerant per record: an entry that fails to deserialize
//! is skipped and counted, never fatal, so one corrupt relay export cannot
//! wedge the whole store.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::warn;

use quill_core::record::{RawRecord, RecordSet};
use quill_core::source::{RecordFilter, RecordSource, TransportError};

/// Current store file format version.
const STORE_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    records: Vec<serde_json::Value>,
}

/// Outcome of loading a store file.
#[derive(Debug)]
pub struct LoadReport {
    /// The deduplicated record set.
    pub records: RecordSet,
    /// Entries skipped because they failed to deserialize.
    pub skipped: usize,
}

/// A record store at a fixed path.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Open a store at `path` (the file need not exist yet).
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The store file location.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the store. A missing file is an empty store.
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but is unreadable, is not the
    /// expected JSON shape, or declares a newer format version.
    pub fn load(&self) -> anyhow::Result<LoadReport> {
        if !self.path.exists() {
            return Ok(LoadReport {
                records: RecordSet::new(),
                skipped: 0,
            });
        }
        let raw = std::fs::read_to_string(&self.path)
            .with_context(|| format!("reading store {}", self.path.display()))?;
        let file: StoreFile = serde_json::from_str(&raw)
            .with_context(|| format!("parsing store {}", self.path.display()))?;
        if file.version > STORE_VERSION {
            anyhow::bail!(
                "store {} is format v{} but this build reads up to v{STORE_VERSION}; upgrade ql",
                self.path.display(),
                file.version
            );
        }

        let mut records = RecordSet::new();
        let mut skipped = 0_usize;
        for value in file.records {
            match serde_json::from_value::<RawRecord>(value) {
                Ok(record) => {
                    records.insert(record);
                }
                Err(err) => {
                    skipped += 1;
                    warn!(%err, "skipping undecodable store entry");
                }
            }
        }
        Ok(LoadReport { records, skipped })
    }

    /// Write the full record set back to disk, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error when serialization or the write fails.
    pub fn save(&self, records: &RecordSet) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let file = StoreFile {
            version: STORE_VERSION,
            records: records
                .iter()
                .map(serde_json::to_value)
                .collect::<Result<_, _>>()
                .context("serializing records")?,
        };
        let json = serde_json::to_string_pretty(&file).context("serializing store")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("writing store {}", self.path.display()))?;
        Ok(())
    }

    /// Fold new records into the store; returns how many were new.
    ///
    /// # Errors
    ///
    /// Returns an error when the load or the save fails.
    pub fn append(&self, incoming: impl IntoIterator<Item = RawRecord>) -> anyhow::Result<usize> {
        let mut report = self.load()?;
        let added = report.records.extend(incoming);
        self.save(&report.records)?;
        Ok(added)
    }
}

impl RecordSource for FileStore {
    fn fetch(&self, filter: &RecordFilter) -> Result<Vec<RawRecord>, TransportError> {
        let report = self
            .load()
            .map_err(|err| TransportError::Unavailable(err.to_string()))?;
        let mut matched: Vec<RawRecord> = report
            .records
            .iter()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect();
        if let Some(limit) = filter.limit {
            matched.truncate(limit);
        }
        Ok(matched)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
