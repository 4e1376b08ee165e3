//! Shared integration test helpers for quire.
//!
//! Include this module at the top of each test file that needs it:
//!
//! ```ignore
//! mod common;
//! use common::{Harness, HarnessBuilder};
//! ```
//!
//! The `#[allow(dead_code)]` attribute suppresses warnings when only a
//! subset of helpers are used per file.

#![allow(dead_code)]

use anyhow::Result;
use parking_lot::Mutex;
use quire::document::{DocumentSaver, FsSaver, SaveRequest};
use quire::ledger::{InMemoryLedger, RecentFilesLedger};
use quire::tab::{CoordinatorParts, TabCoordinator};
use quire::view::{ChromeView, ContentPager, TabSnapshot, TabStripView, Views};
use quire_config::defaults::PREFERENCES_FILE_NAME;
use quire_config::{FilePreferenceStore, Preferences};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::TempDir;

/// Everything the views were told, in order
#[derive(Debug, Default)]
pub struct ViewLog {
    /// Titles of every list pushed to the tab strip
    pub tab_lists: Vec<Vec<String>>,
    pub strip_highlights: Vec<usize>,
    pub page_sets: usize,
    pub pages: Vec<usize>,
    pub toolbar_titles: Vec<String>,
    pub drawer_opened: usize,
    pub menu_closed: usize,
}

impl ViewLog {
    pub fn last_tab_list(&self) -> Option<&Vec<String>> {
        self.tab_lists.last()
    }
}

pub type SharedViewLog = Arc<Mutex<ViewLog>>;

struct Recorder(SharedViewLog);

impl TabStripView for Recorder {
    fn set_tabs(&mut self, snapshot: &TabSnapshot) {
        let titles = snapshot.tabs.iter().map(|t| t.title.clone()).collect();
        self.0.lock().tab_lists.push(titles);
    }

    fn set_current_tab(&mut self, position: usize) {
        self.0.lock().strip_highlights.push(position);
    }
}

impl ContentPager for Recorder {
    fn set_pages(&mut self, _snapshot: &TabSnapshot) {
        self.0.lock().page_sets += 1;
    }

    fn set_current_page(&mut self, position: usize) {
        self.0.lock().pages.push(position);
    }
}

impl ChromeView for Recorder {
    fn set_title(&mut self, title: &str) {
        self.0.lock().toolbar_titles.push(title.to_string());
    }

    fn open_navigation_drawer(&mut self) {
        self.0.lock().drawer_opened += 1;
    }

    fn close_tab_menu(&mut self) {
        self.0.lock().menu_closed += 1;
    }
}

/// Views that record into a shared log
pub fn recording_views() -> (Views, SharedViewLog) {
    let log = SharedViewLog::default();
    let views = Views::new(
        Box::new(Recorder(log.clone())),
        Box::new(Recorder(log.clone())),
        Box::new(Recorder(log.clone())),
    );
    (views, log)
}

/// Saver that records each request and tracks how many run at once
#[derive(Debug, Default)]
pub struct RecordingSaver {
    pub saved: Mutex<Vec<SaveRequest>>,
    pub delay: Option<Duration>,
    pub fail: bool,
    /// Also write each request to disk through `FsSaver`
    pub write_through: bool,
    running: AtomicUsize,
    pub max_concurrent: AtomicUsize,
}

impl RecordingSaver {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn writing_to_disk() -> Self {
        Self {
            write_through: true,
            ..Self::default()
        }
    }

    pub fn saved_paths(&self) -> Vec<Option<PathBuf>> {
        self.saved.lock().iter().map(|r| r.path.clone()).collect()
    }
}

impl DocumentSaver for RecordingSaver {
    fn save(&self, request: &SaveRequest) -> Result<()> {
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_concurrent.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        self.saved.lock().push(request.clone());
        self.running.fetch_sub(1, Ordering::SeqCst);
        if self.fail {
            anyhow::bail!("disk full");
        }
        if self.write_through {
            FsSaver.save(request)?;
        }
        Ok(())
    }
}

/// A running coordinator plus handles to everything around it
pub struct Harness {
    pub coordinator: TabCoordinator,
    pub views: SharedViewLog,
    pub saver: Arc<RecordingSaver>,
    pub ledger: Arc<InMemoryLedger>,
    pub dir: TempDir,
}

impl Harness {
    /// Create an empty file inside the harness directory
    pub fn touch(&self, name: &str) -> PathBuf {
        touch(self.dir.path(), name)
    }

    pub fn write_file(&self, name: &str, contents: &str) -> PathBuf {
        write_file(self.dir.path(), name, contents)
    }

    pub fn preferences_path(&self) -> PathBuf {
        self.dir.path().join(PREFERENCES_FILE_NAME)
    }

    /// Preferences as currently stored on disk
    pub fn stored_preferences(&self) -> Preferences {
        Preferences::load_from(&self.preferences_path()).expect("Failed to reload preferences")
    }

    pub fn titles(&self) -> Vec<String> {
        self.coordinator
            .snapshot()
            .tabs
            .into_iter()
            .map(|t| t.title)
            .collect()
    }

    pub fn toolbar_titles(&self) -> Vec<String> {
        self.views.lock().toolbar_titles.clone()
    }

    /// Canonical path of a file in the harness directory
    pub fn canonical(&self, name: &str) -> PathBuf {
        std::fs::canonicalize(self.dir.path().join(name)).expect("Failed to canonicalize")
    }
}

/// Create a file with `contents` inside the harness directory
pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("Failed to write file");
    path
}

pub fn touch(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, "").expect("Failed to create file");
    path
}

/// Builds a [`Harness`]; must be used inside a tokio runtime
pub struct HarnessBuilder {
    prefs: Preferences,
    saver: RecordingSaver,
    ledger: Arc<InMemoryLedger>,
    dir: TempDir,
}

impl HarnessBuilder {
    /// Restore disabled, empty ledger
    pub fn new() -> Self {
        let prefs = Preferences {
            open_last_files: false,
            ..Preferences::default()
        };
        Self {
            prefs,
            saver: RecordingSaver::default(),
            ledger: Arc::new(InMemoryLedger::new(100)),
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn restore(mut self, enabled: bool) -> Self {
        self.prefs.open_last_files = enabled;
        self
    }

    pub fn last_tab(mut self, position: usize) -> Self {
        self.prefs.last_tab = position;
        self
    }

    pub fn shutdown_timeout_ms(mut self, ms: u64) -> Self {
        self.prefs.shutdown_save_timeout_ms = Some(ms);
        self
    }

    pub fn saver(mut self, saver: RecordingSaver) -> Self {
        self.saver = saver;
        self
    }

    pub fn ledger(mut self, ledger: Arc<InMemoryLedger>) -> Self {
        self.ledger = ledger;
        self
    }

    /// Add an active ledger row pointing at a file in the harness directory
    pub fn with_active_file(self, name: &str, offset: usize) -> Self {
        let path = touch(self.dir.path(), name);
        let path = std::fs::canonicalize(path).expect("Failed to canonicalize");
        self.ledger
            .upsert_entry(&path, offset, "UTF-8", true)
            .expect("Failed to seed ledger");
        self
    }

    pub fn start(self) -> Harness {
        let prefs_path = self.dir.path().join(PREFERENCES_FILE_NAME);
        self.prefs
            .save_to(&prefs_path)
            .expect("Failed to write preferences");
        let store = FilePreferenceStore::open(prefs_path).expect("Failed to open preferences");

        let (views, log) = recording_views();
        let saver = Arc::new(self.saver);
        let coordinator = TabCoordinator::start(CoordinatorParts {
            views,
            preferences: Box::new(store),
            ledger: self.ledger.clone(),
            saver: saver.clone(),
            runtime: tokio::runtime::Handle::current(),
        });

        Harness {
            coordinator,
            views: log,
            saver,
            ledger: self.ledger,
            dir: self.dir,
        }
    }
}

impl Default for HarnessBuilder {
    fn default() -> Self {
        Self::new()
    }
}
