//! Save-then-close, auto-save and the shutdown sequence

use super::{CoordinatorEvent, TabCoordinator};
use crate::document::save::{SaveKind, spawn_save};
use crate::document::{CloseReport, DEFAULT_ENCODING, DocumentId, SaveOutcome};
use crate::error::{CoordinatorError, Result};
use crate::shutdown::ShutdownPhase;
use std::time::Duration;

impl TabCoordinator {
    /// Save the document at `position` in the background, then remove it
    ///
    /// The tab stays in place until the save reports back. The ledger row
    /// written on completion is always marked inactive, even when shutdown
    /// begins before the save returns.
    pub fn close_tab(&mut self, position: usize) -> Result<()> {
        self.ensure_running()?;
        let doc = self
            .registry
            .get(position)
            .ok_or_else(|| self.invalid_position(position))?;
        if doc.is_closing() {
            return Err(CoordinatorError::AlreadyClosing(position));
        }
        log::info!("Closing tab {} (document {})", position, doc.id());
        self.begin_close(position, false);
        Ok(())
    }

    /// Close every document, one at a time, then terminate
    ///
    /// Returns `false` when a shutdown is already under way.
    pub fn close_all_and_exit(&mut self) -> bool {
        if self.shutdown.is_exiting() {
            log::debug!("Shutdown already in progress");
            return false;
        }
        self.shutdown.begin();
        self.phase = ShutdownPhase::Exiting { closed: 0 };

        if let Some(last) = self.surviving_current()
            && let Err(e) = self.preferences.set_last_active_position(last)
        {
            log::warn!("Failed to save last active tab: {:#}", e);
        }

        log::info!("Closing {} tab(s) before exit", self.registry.count());
        self.close_next_for_exit();
        true
    }

    /// Start closing the first document, or finish when none are left
    fn close_next_for_exit(&mut self) {
        if self.registry.is_empty() {
            self.phase = ShutdownPhase::Terminated;
            log::info!("All tabs closed, terminating");
            return;
        }
        // One close at a time; a close_tab issued before shutdown may still be running
        if self.registry.count_closing() > 0 {
            return;
        }
        self.begin_close(0, true);
    }

    /// Current position counted among the tabs that are not already closing
    ///
    /// Those are the tabs a restored session brings back, in the same order.
    fn surviving_current(&self) -> Option<usize> {
        let current = self.current?;
        let surviving = self.registry.count() - self.registry.count_closing();
        if surviving == 0 {
            return None;
        }
        let closing_before = self
            .registry
            .iter()
            .take(current)
            .filter(|d| d.is_closing())
            .count();
        Some((current - closing_before).min(surviving - 1))
    }

    /// Flag the document as closing and dispatch its save
    ///
    /// `exit` marks closes driven by the shutdown sequence; only those may
    /// leave the ledger row active.
    fn begin_close(&mut self, position: usize, exit: bool) {
        let shutdown = self.shutdown.clone();
        let timeout = self.save_timeout();
        let Some(doc) = self.registry.get_mut(position) else {
            return;
        };
        doc.closing = true;
        let request = doc.save_request(shutdown);

        self.pending_saves += 1;
        spawn_save(
            &self.runtime,
            self.saver.clone(),
            request,
            SaveKind::Close { exit },
            timeout,
            self.events_tx.clone(),
        );
        self.publish_tab_list();
    }

    /// Bound on a single save, applied only while exiting
    fn save_timeout(&self) -> Option<Duration> {
        if !self.shutdown.is_exiting() {
            return None;
        }
        self.preferences
            .preferences()
            .shutdown_save_timeout_ms
            .map(Duration::from_millis)
    }

    /// Save every modified file-backed document in the background
    ///
    /// Does nothing once shutdown has begun. Returns the number of saves started.
    pub fn auto_save(&mut self) -> usize {
        if self.shutdown.is_auto_save_disabled() {
            log::debug!("Auto-save skipped, shutdown in progress");
            return 0;
        }

        let requests: Vec<_> = self
            .registry
            .iter()
            .filter(|d| d.backing_path().is_some() && d.is_modified() && !d.is_closing())
            .map(|d| d.save_request(self.shutdown.clone()))
            .collect();

        let started = requests.len();
        for request in requests {
            self.pending_saves += 1;
            spawn_save(
                &self.runtime,
                self.saver.clone(),
                request,
                SaveKind::AutoSave,
                None,
                self.events_tx.clone(),
            );
        }
        if started > 0 {
            log::debug!("Auto-saving {} document(s)", started);
        }
        started
    }

    /// Apply one completion on the owning thread
    pub fn handle_event(&mut self, event: CoordinatorEvent) {
        self.pending_saves = self.pending_saves.saturating_sub(1);
        match event {
            CoordinatorEvent::CloseCompleted(report) => self.finish_close(report),
            CoordinatorEvent::AutoSaveCompleted {
                id,
                revision,
                outcome,
            } => self.finish_auto_save(id, revision, outcome),
        }
    }

    /// Apply every completion that has already arrived
    pub fn poll_events(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    /// Wait for the next completion; `None` when no save is outstanding
    pub async fn next_event(&mut self) -> Option<CoordinatorEvent> {
        if self.pending_saves == 0 {
            return None;
        }
        self.events_rx.recv().await
    }

    /// Handle completions until no save is outstanding
    ///
    /// After `close_all_and_exit` this drives the whole shutdown sequence.
    pub async fn run_until_idle(&mut self) {
        while let Some(event) = self.next_event().await {
            self.handle_event(event);
        }
    }

    fn finish_close(&mut self, report: CloseReport) {
        let Some(position) = self.registry.position_of(report.id) else {
            log::warn!("Close completed for unknown document {}", report.id);
            return;
        };

        match &report.outcome {
            SaveOutcome::Saved => {}
            SaveOutcome::Failed(reason) => {
                log::error!("Save failed while closing document {}: {}", report.id, reason)
            }
            SaveOutcome::TimedOut => {
                log::warn!("Save timed out while closing document {}", report.id)
            }
        }

        let exiting = self.shutdown.is_exiting();
        let active = report.for_exit && self.preferences.is_restore_last_session_enabled();
        self.record_closed(&report, active);

        self.registry.remove_document(position);
        let emptied = self.registry.is_empty();
        // Keep pointing at the same document; clamp if it was the one removed
        self.current = match self.current {
            _ if emptied => None,
            Some(current) if current > position => Some(current - 1),
            Some(current) => Some(current.min(self.registry.count() - 1)),
            None => Some(0),
        };
        log::info!(
            "Closed tab {} (remaining: {})",
            position,
            self.registry.count()
        );

        self.structure_changed();

        if exiting {
            if let ShutdownPhase::Exiting { closed } = self.phase {
                self.phase = ShutdownPhase::Exiting { closed: closed + 1 };
            }
            self.close_next_for_exit();
        } else if !emptied && let Some(current) = self.current {
            self.activate(current);
        }
    }

    /// Write the ledger row for a closed file-backed document
    fn record_closed(&self, report: &CloseReport, active: bool) {
        let Some(path) = report.path.as_deref() else {
            return;
        };
        let encoding = report.encoding.as_deref().unwrap_or(DEFAULT_ENCODING);
        if let Err(e) = self
            .ledger
            .upsert_entry(path, report.offset, encoding, active)
        {
            log::warn!("Failed to update recent files for {:?}: {:#}", path, e);
        }
    }

    fn finish_auto_save(&mut self, id: DocumentId, revision: u64, outcome: SaveOutcome) {
        let Some(position) = self.registry.position_of(id) else {
            return;
        };
        match outcome {
            SaveOutcome::Saved => {
                let Some(doc) = self.registry.get_mut(position) else {
                    return;
                };
                if doc.revision() != revision {
                    return;
                }
                doc.set_modified(false);
                self.on_document_changed(position);
            }
            SaveOutcome::Failed(reason) => {
                log::error!("Auto-save failed for document {}: {}", id, reason)
            }
            SaveOutcome::TimedOut => log::warn!("Auto-save timed out for document {}", id),
        }
    }
}
