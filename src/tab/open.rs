//! Creating tabs and opening files

use super::TabCoordinator;
use crate::document::{DocumentSource, SearchResultSet};
use crate::error::{CoordinatorError, Result};
use std::path::{Path, PathBuf};

impl TabCoordinator {
    /// Open a blank "new file N" tab and make it current
    pub fn new_tab(&mut self) -> Result<usize> {
        self.ensure_running()?;
        // Tab number is based on current count, not unique ID
        let label = self.untitled_label(self.registry.count() + 1);
        Ok(self.append_and_activate(DocumentSource::Unsaved { label }, String::new()))
    }

    /// Open an unsaved tab pre-filled with `content`
    pub fn new_tab_with_content(&mut self, content: impl Into<String>) -> Result<usize> {
        self.ensure_running()?;
        let label = self.untitled_label(self.registry.count() + 1);
        Ok(self.append_and_activate(DocumentSource::Unsaved { label }, content.into()))
    }

    /// Open a read-only tab listing search results
    pub fn new_search_tab(&mut self, results: SearchResultSet) -> Result<usize> {
        self.ensure_running()?;
        let text = results.render();
        log::debug!(
            "Opening search results for '{}' ({} matches)",
            results.pattern,
            results.matches.len()
        );
        Ok(self.append_and_activate(DocumentSource::SearchResults(results), text))
    }

    /// Focus the tab already showing `path`, or open it in a new tab
    ///
    /// Returns `true` when a new tab was created. Paths are compared after
    /// resolving them, so `./a.txt` and `/abs/a.txt` are the same file.
    /// A new tab is loaded from disk and gets an active recent-files row.
    pub fn open_or_focus(
        &mut self,
        path: impl AsRef<Path>,
        offset: usize,
        encoding: &str,
    ) -> Result<bool> {
        self.ensure_running()?;
        let resolved = resolve_path(path.as_ref())?;

        if let Some(position) = self.registry.find_by_path(&resolved) {
            log::debug!("{:?} already open at tab {}", resolved, position);
            self.activate(position);
            return Ok(false);
        }

        let text = read_contents(&resolved)?;
        if let Err(e) = self.ledger.upsert_entry(&resolved, offset, encoding, true) {
            log::warn!("Failed to update recent files for {:?}: {:#}", resolved, e);
        }
        let position = self.append_and_activate(
            DocumentSource::FileBacked {
                path: resolved,
                encoding: encoding.to_string(),
                offset,
            },
            text,
        );
        log::info!("Opened file in tab {}", position);
        Ok(true)
    }

    /// Append a document, announce the structural change and make it current
    pub(super) fn append_and_activate(&mut self, source: DocumentSource, text: String) -> usize {
        let position = self.registry.create_document(source, text);
        self.structure_changed();
        self.activate(position);
        log::info!(
            "Created tab {} (total: {})",
            position,
            self.registry.count()
        );
        position
    }
}

/// Absolute, symlink-free form of `path` when it exists; otherwise made
/// absolute against the working directory
pub fn resolve_path(path: &Path) -> Result<PathBuf> {
    let resolved = if path.exists() {
        std::fs::canonicalize(path)
    } else {
        std::path::absolute(path)
    };
    resolved.map_err(|source| CoordinatorError::PathResolution {
        path: path.to_path_buf(),
        source,
    })
}

/// Current contents of `path`; a file that does not exist yet starts empty
pub(super) fn read_contents(path: &Path) -> Result<String> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(source) => Err(CoordinatorError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}
