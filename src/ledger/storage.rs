//! YAML-backed recent-files ledger
//!
//! The ledger is stored in `~/.config/quire/recent_files.yaml` and rewritten
//! atomically after every change.

use super::{LEDGER_FILE_NAME, LedgerTable, RecentFileEntry, RecentFilesLedger};
use anyhow::{Context, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Get the path to the ledger file
pub fn ledger_path() -> PathBuf {
    quire_config::Preferences::config_dir().join(LEDGER_FILE_NAME)
}

/// On-disk layout of the ledger file
#[derive(Debug, Default, Serialize, Deserialize)]
struct LedgerFile {
    #[serde(default)]
    saved_at: String,
    #[serde(flatten)]
    table: LedgerTable,
}

#[derive(Debug)]
pub struct YamlLedger {
    path: PathBuf,
    limit: usize,
    table: Mutex<LedgerTable>,
}

impl YamlLedger {
    /// Open the ledger stored at `path`
    ///
    /// A missing or empty file yields an empty ledger. A corrupt file is an error.
    pub fn open(path: PathBuf, limit: usize) -> Result<Self> {
        let table = load_table_from(&path)?.unwrap_or_default();
        log::info!(
            "Loaded recent files ledger ({} entries) from {:?}",
            table.entries.len(),
            path
        );
        Ok(Self {
            path,
            limit: limit.max(1),
            table: Mutex::new(table),
        })
    }
}

impl RecentFilesLedger for YamlLedger {
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
        let mut table = self.table.lock();
        table.upsert(path, offset, encoding, active, self.limit);
        save_table_to(&table, &self.path)
    }
}

fn load_table_from(path: &Path) -> Result<Option<LedgerTable>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read recent files from {:?}", path))?;

    if contents.trim().is_empty() {
        return Ok(None);
    }

    let file: LedgerFile = serde_yaml_ng::from_str(&contents)
        .with_context(|| format!("Failed to parse recent files from {:?}", path))?;
    Ok(Some(file.table))
}

fn save_table_to(table: &LedgerTable, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory {:?}", parent))?;
    }

    let file = LedgerFile {
        saved_at: chrono::Utc::now().to_rfc3339(),
        table: table.clone(),
    };
    let contents = serde_yaml_ng::to_string(&file).context("Failed to serialize recent files")?;

    // Atomic save: write to temp file then rename
    let temp_path = path.with_extension("yaml.tmp");
    std::fs::write(&temp_path, contents)
        .with_context(|| format!("Failed to write recent files to {:?}", temp_path))?;
    std::fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to move recent files into place at {:?}", path))?;

    log::debug!(
        "Saved recent files ledger ({} entries) to {:?}",
        table.entries.len(),
        path
    );
    Ok(())
}
