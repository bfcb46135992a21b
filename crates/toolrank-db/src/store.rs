//! Persistent history tables.
//!
//! A history store maps a string key (e.g. `history_trends_US`) to one
//! monthly table. Loading never fails: a missing or unreadable entry is an
//! empty history, so a corrupt file costs one refresh of backfill rather than
//! the whole run.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use toolrank_common::Table;
use tracing::{debug, info, warn};

use crate::codec::{read_table, write_table};
use crate::error::{DbError, Result};

pub trait HistoryStore: Send + Sync {
    /// Load the table stored under `key`; empty if absent or unreadable.
    fn load(&self, key: &str) -> Table;

    /// Replace the table stored under `key`. Saving an empty table is a no-op.
    fn save(&self, key: &str, table: &Table) -> Result<()>;
}

/// Keys become file names, so they are restricted to a safe alphabet.
pub fn validate_key(key: &str) -> Result<()> {
    let ok = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if ok {
        Ok(())
    } else {
        Err(DbError::InvalidKey(key.to_string()))
    }
}

// ── CSV directory store ──────────────────────────────────────────────────────

/// One `<key>.csv` file per key under a data directory.
#[derive(Debug, Clone)]
pub struct CsvHistoryStore {
    dir: PathBuf,
}

impl CsvHistoryStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.csv"))
    }

    fn try_load(&self, key: &str) -> Result<Option<Table>> {
        validate_key(key)?;
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let file = File::open(&path)?;
        Ok(Some(read_table(BufReader::new(file))?))
    }
}

impl HistoryStore for CsvHistoryStore {
    fn load(&self, key: &str) -> Table {
        match self.try_load(key) {
            Ok(Some(table)) => {
                debug!(
                    key,
                    months = table.month_count(),
                    tools = table.columns().len(),
                    "Loaded history"
                );
                table
            }
            Ok(None) => {
                debug!(key, "No stored history");
                Table::new()
            }
            Err(e) => {
                warn!(key, error = %e, "Could not read history, starting empty");
                Table::new()
            }
        }
    }

    fn save(&self, key: &str, table: &Table) -> Result<()> {
        validate_key(key)?;
        if table.is_empty() {
            debug!(key, "Skipping save of empty table");
            return Ok(());
        }
        fs::create_dir_all(&self.dir)?;

        // write beside the target, then swap in
        let path = self.path_for(key);
        let tmp = self.dir.join(format!("{key}.csv.tmp"));
        write_table(File::create(&tmp)?, table)?;
        fs::rename(&tmp, &path)?;

        info!(key, path = %path.display(), months = table.month_count(), "Saved history");
        Ok(())
    }
}

// ── In-memory store ──────────────────────────────────────────────────────────

/// Process-local store for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    tables: Mutex<HashMap<String, Table>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate an entry.
    pub fn with(self, key: &str, table: Table) -> Self {
        self.lock().insert(key.to_string(), table);
        self
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.lock().keys().cloned().collect();
        keys.sort();
        keys
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Table>> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn load(&self, key: &str) -> Table {
        self.lock().get(key).cloned().unwrap_or_default()
    }

    fn save(&self, key: &str, table: &Table) -> Result<()> {
        validate_key(key)?;
        if table.is_empty() {
            return Ok(());
        }
        self.lock().insert(key.to_string(), table.clone());
        Ok(())
    }
}
