//! Tab coordinator
//!
//! `TabCoordinator` is the single owner of every open document and the
//! only component allowed to change the tab structure or the current tab.
//! It lives on the UI thread; saves run in the background and report back
//! through [`CoordinatorEvent`]s that the host feeds into
//! [`TabCoordinator::handle_event`] (or drains with
//! [`TabCoordinator::poll_events`] / [`TabCoordinator::run_until_idle`]).
//!
//! The implementation is split across several files:
//! - `open`: creating tabs and opening files
//! - `close`: save-then-close, auto-save and shutdown
//! - `sync`: current-tab changes and view updates

mod close;
mod open;
mod sync;

pub use open::resolve_path;

use crate::document::{
    CloseReport, DocumentHandle, DocumentId, DocumentSaver, DocumentSource, SaveOutcome,
};
use crate::error::{CoordinatorError, Result};
use crate::ledger::RecentFilesLedger;
use crate::registry::DocumentRegistry;
use crate::shutdown::{ShutdownContext, ShutdownPhase};
use crate::view::{TabInfo, TabSnapshot, Views};
use quire_config::PreferenceStore;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Completion reported by a background save
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoordinatorEvent {
    /// A save-then-close finished; the document can now be removed
    CloseCompleted(CloseReport),
    /// An auto-save finished for the document at `revision`
    AutoSaveCompleted {
        id: DocumentId,
        revision: u64,
        outcome: SaveOutcome,
    },
}

/// Everything the coordinator needs from its host
pub struct CoordinatorParts {
    pub views: Views,
    pub preferences: Box<dyn PreferenceStore>,
    pub ledger: Arc<dyn RecentFilesLedger>,
    pub saver: Arc<dyn DocumentSaver>,
    /// Runtime the background saves are spawned on
    pub runtime: Handle,
}

pub struct TabCoordinator {
    registry: DocumentRegistry,
    /// Position of the current tab; `None` only while the registry is empty
    current: Option<usize>,
    views: Views,
    preferences: Box<dyn PreferenceStore>,
    ledger: Arc<dyn RecentFilesLedger>,
    saver: Arc<dyn DocumentSaver>,
    runtime: Handle,
    shutdown: ShutdownContext,
    phase: ShutdownPhase,
    events_tx: UnboundedSender<CoordinatorEvent>,
    events_rx: UnboundedReceiver<CoordinatorEvent>,
    /// Saves started but not yet handled
    pending_saves: usize,
    /// Last title pushed to the toolbar
    toolbar_title: Option<String>,
}

impl TabCoordinator {
    /// Build the coordinator and bring up the initial tabs
    ///
    /// Restores the previous session when the preference allows it, and
    /// always leaves at least one tab open.
    pub fn start(parts: CoordinatorParts) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let mut coordinator = Self {
            registry: DocumentRegistry::new(),
            current: None,
            views: parts.views,
            preferences: parts.preferences,
            ledger: parts.ledger,
            saver: parts.saver,
            runtime: parts.runtime,
            shutdown: ShutdownContext::new(),
            phase: ShutdownPhase::Running,
            events_tx,
            events_rx,
            pending_saves: 0,
            toolbar_title: None,
        };

        coordinator.restore_session();

        if coordinator.registry.is_empty() {
            let label = coordinator.untitled_label(coordinator.registry.count_unsaved() + 1);
            coordinator.append_and_activate(DocumentSource::Unsaved { label }, String::new());
        }

        log::info!(
            "Tab coordinator started with {} tab(s)",
            coordinator.registry.count()
        );
        coordinator
    }

    /// Reopen the files the ledger flags as active
    fn restore_session(&mut self) {
        if !self.preferences.is_restore_last_session_enabled() {
            log::debug!("Session restore disabled");
            return;
        }

        let entries = match self.ledger.list_active_entries() {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Failed to read recent files: {:#}", e);
                return;
            }
        };

        for entry in entries {
            if !entry.path.is_file() {
                log::info!("Skipping missing file {:?} during restore", entry.path);
                continue;
            }
            if self.registry.find_by_path(&entry.path).is_some() {
                continue;
            }
            let text = match open::read_contents(&entry.path) {
                Ok(text) => text,
                Err(e) => {
                    log::warn!("Skipping unreadable file during restore: {}", e);
                    continue;
                }
            };
            let position = self.registry.create_document(
                DocumentSource::FileBacked {
                    path: entry.path,
                    encoding: entry.encoding,
                    offset: entry.offset,
                },
                text,
            );
            self.activate(position);
        }

        if self.registry.is_empty() {
            return;
        }

        self.publish_structure();

        let last = self
            .preferences
            .last_active_position()
            .min(self.registry.count() - 1);
        self.activate(last);
        log::info!(
            "Restored {} tab(s), current tab {}",
            self.registry.count(),
            last
        );
    }

    /// Number of open documents
    pub fn tab_count(&self) -> usize {
        self.registry.count()
    }

    /// Position of the current tab
    pub fn current_tab(&self) -> Option<usize> {
        self.current
    }

    pub fn document(&self, position: usize) -> Option<&DocumentHandle> {
        self.registry.get(position)
    }

    pub fn documents(&self) -> impl Iterator<Item = &DocumentHandle> {
        self.registry.iter()
    }

    pub fn position_of(&self, id: DocumentId) -> Option<usize> {
        self.registry.position_of(id)
    }

    /// Snapshot of the tab strip as it would be published now
    pub fn snapshot(&self) -> TabSnapshot {
        let tabs = self
            .registry
            .iter()
            .enumerate()
            .map(|(position, doc)| TabInfo {
                position,
                id: doc.id(),
                title: doc.display_title(),
                path: doc.backing_path().map(|p| p.to_path_buf()),
                modified: doc.is_modified(),
                closing: doc.is_closing(),
            })
            .collect::<Vec<_>>();
        let current = self.current.filter(|&c| c < tabs.len());
        TabSnapshot { tabs, current }
    }

    pub fn ledger(&self) -> &Arc<dyn RecentFilesLedger> {
        &self.ledger
    }

    pub fn shutdown_context(&self) -> &ShutdownContext {
        &self.shutdown
    }

    pub fn phase(&self) -> ShutdownPhase {
        self.phase
    }

    pub fn is_exiting(&self) -> bool {
        self.shutdown.is_exiting()
    }

    /// Every document closed after `close_all_and_exit`
    pub fn is_terminated(&self) -> bool {
        self.phase == ShutdownPhase::Terminated
    }

    /// Saves started but not yet handled
    pub fn pending_saves(&self) -> usize {
        self.pending_saves
    }

    fn untitled_label(&self, number: usize) -> String {
        self.preferences.preferences().untitled_label(number)
    }

    fn ensure_running(&self) -> Result<()> {
        if self.shutdown.is_exiting() {
            Err(CoordinatorError::ShuttingDown)
        } else {
            Ok(())
        }
    }

    fn invalid_position(&self, position: usize) -> CoordinatorError {
        CoordinatorError::InvalidPosition {
            position,
            count: self.registry.count(),
        }
    }
}
