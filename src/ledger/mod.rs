//! Recent-files ledger
//!
//! Remembers which files were open, where the cursor was and in which
//! encoding, plus whether each file should be reopened on the next launch.
//! Rows are kept in the order they were last written, so the active rows
//! come back in the same order the tabs had when they were closed.

pub mod storage;

pub use storage::{YamlLedger, ledger_path};

use anyhow::Result;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the ledger inside the config directory
pub const LEDGER_FILE_NAME: &str = "recent_files.yaml";

/// One remembered file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentFileEntry {
    pub path: PathBuf,
    #[serde(default)]
    pub offset: usize,
    #[serde(default = "default_encoding")]
    pub encoding: String,
    /// Reopen this file on the next launch
    #[serde(default)]
    pub active: bool,
    /// RFC 3339 timestamp of the last write
    #[serde(default)]
    pub last_opened: String,
}

fn default_encoding() -> String {
    crate::document::DEFAULT_ENCODING.to_string()
}

/// Store of recently opened files
pub trait RecentFilesLedger: Send + Sync {
    /// Entries flagged for reopening, oldest write first
    fn list_active_entries(&self) -> Result<Vec<RecentFileEntry>>;

    /// Every entry, most recent first
    fn list_entries(&self) -> Result<Vec<RecentFileEntry>>;

    /// Insert or update the row for `path`
    fn upsert_entry(
        &self,
        path: &Path,
        offset: usize,
        encoding: &str,
        active: bool,
    ) -> Result<()>;
}

/// Ordered rows plus eviction, shared by every ledger backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerTable {
    #[serde(default)]
    pub entries: Vec<RecentFileEntry>,
}

impl LedgerTable {
    pub fn active_entries(&self) -> Vec<RecentFileEntry> {
        self.entries.iter().filter(|e| e.active).cloned().collect()
    }

    pub fn most_recent_first(&self) -> Vec<RecentFileEntry> {
        self.entries.iter().rev().cloned().collect()
    }

    /// Update the row for `path` (moving it to the end) or append a new one,
    /// then evict down to `limit` rows
    pub fn upsert(
        &mut self,
        path: &Path,
        offset: usize,
        encoding: &str,
        active: bool,
        limit: usize,
    ) {
        let now = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        let entry = match self.entries.iter().position(|e| e.path == path) {
            Some(index) => {
                let mut entry = self.entries.remove(index);
                entry.offset = offset;
                entry.encoding = encoding.to_string();
                entry.active = active;
                entry.last_opened = now;
                entry
            }
            None => RecentFileEntry {
                path: path.to_path_buf(),
                offset,
                encoding: encoding.to_string(),
                active,
                last_opened: now,
            },
        };
        self.entries.push(entry);
        self.evict(limit);
    }

    /// Drop the oldest inactive rows first, then the oldest rows overall.
    /// The row just written is never chosen while older rows exist.
    fn evict(&mut self, limit: usize) {
        while self.entries.len() > limit {
            let older = self.entries.len() - 1;
            let victim = self.entries[..older]
                .iter()
                .position(|e| !e.active)
                .unwrap_or(0);
            let removed = self.entries.remove(victim);
            log::debug!("Evicted {} from recent files", removed.path.display());
        }
    }
}

/// Ledger kept only in memory
#[derive(Debug)]
pub struct InMemoryLedger {
    table: Mutex<LedgerTable>,
    limit: usize,
}

impl InMemoryLedger {
    pub fn new(limit: usize) -> Self {
        Self {
            table: Mutex::new(LedgerTable::default()),
            limit: limit.max(1),
        }
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new(quire_config::defaults::recent_files_limit())
    }
}

impl RecentFilesLedger for InMemoryLedger {
    fn list_active_entries(&self) -> Result<Vec<RecentFileEntry>> {
        Ok(self.table.lock().active_entries())
    }

    fn list_entries(&self) -> Result<Vec<RecentFileEntry>> {
        Ok(self.table.lock().most_recent_first())
    }

    fn upsert_entry(
        &self,
        path: &Path,
        offset: usize,
        encoding: &str,
        active: bool,
    ) -> Result<()> {
        self.table
            .lock()
            .upsert(path, offset, encoding, active, self.limit);
        Ok(())
    }
}
