//! Preference store consumed by the tab coordinator.
//!
//! The coordinator only needs three facts from the preference layer: whether
//! to restore the previous session, which tab was current when it ended, and
//! a place to record the current tab on the way out.

use crate::preferences::Preferences;
use anyhow::Result;
use std::path::PathBuf;

/// Read/write access to the preferences the coordinator depends on
pub trait PreferenceStore {
    /// Full preference document (labels, limits, timeouts)
    fn preferences(&self) -> &Preferences;

    /// Whether the files open at last exit should be reopened
    fn is_restore_last_session_enabled(&self) -> bool {
        self.preferences().open_last_files
    }

    /// Position of the tab that was current at last exit
    fn last_active_position(&self) -> usize {
        self.preferences().last_tab
    }

    /// Record the current tab for the next session
    fn set_last_active_position(&mut self, position: usize) -> Result<()>;
}

/// In-memory store: nothing is persisted
impl PreferenceStore for Preferences {
    fn preferences(&self) -> &Preferences {
        self
    }

    fn set_last_active_position(&mut self, position: usize) -> Result<()> {
        self.last_tab = position;
        Ok(())
    }
}

/// Preference store backed by a YAML file; every write is saved immediately
#[derive(Debug, Clone)]
pub struct FilePreferenceStore {
    path: PathBuf,
    prefs: Preferences,
}

impl FilePreferenceStore {
    /// Open the store at `path`, loading existing preferences if present
    pub fn open(path: PathBuf) -> Result<Self> {
        let prefs = Preferences::load_from(&path)?;
        Ok(Self { path, prefs })
    }

    /// Write the current preferences to disk
    pub fn flush(&self) -> Result<()> {
        self.prefs.save_to(&self.path)
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    fn set_last_active_position(&mut self, position: usize) -> Result<()> {
        self.prefs.last_tab = position;
        self.flush()?;
        log::debug!("Recorded last active tab {} in {:?}", position, self.path);
        Ok(())
    }
}
