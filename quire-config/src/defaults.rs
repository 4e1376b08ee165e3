//! Default values for preference fields.

// ── Primitive helpers ──────────────────────────────────────────────────────

pub fn bool_true() -> bool {
    true
}

pub fn zero() -> usize {
    0
}

// ── Tabs ───────────────────────────────────────────────────────────────────

/// Prefix of blank-tab labels ("new file 1", "new file 2", ...)
pub fn untitled_prefix() -> String {
    "new file".to_string()
}

// ── Ledger ─────────────────────────────────────────────────────────────────

/// Maximum number of rows kept in the recent-files ledger
pub fn recent_files_limit() -> usize {
    100
}

// ── Paths ──────────────────────────────────────────────────────────────────

/// Name of the application directory under the platform config dir
pub const APP_DIR_NAME: &str = "quire";

/// File name of the preferences document
pub const PREFERENCES_FILE_NAME: &str = "preferences.yaml";
