//! Document model for open tabs
//!
//! This module provides the per-tab state the coordinator owns:
//! - `DocumentHandle`: identity, buffer and dirty state of one open document
//! - `DocumentSource`: what backs the document (nothing, a file, a search)
//! - `DocumentId`: stable identifier that survives position shifts

pub mod save;

pub use save::{CloseReport, DocumentSaver, FsSaver, SaveOutcome, SaveRequest};

use crate::shutdown::ShutdownContext;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Unique identifier for a document, assigned by the registry.
/// Positions change as tabs close; ids never do.
pub type DocumentId = u64;

/// Encoding label used when nothing better is known
pub const DEFAULT_ENCODING: &str = "UTF-8";

/// One line matched by a grep-style search
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchMatch {
    /// File containing the match
    pub path: PathBuf,
    /// 1-based line number
    pub line: usize,
    /// Text of the matching line
    pub text: String,
}

/// Result set of a multi-file search, shown in its own tab
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResultSet {
    /// Pattern the user searched for
    pub pattern: String,
    /// Matches in the order they were found
    pub matches: Vec<SearchMatch>,
}

impl SearchResultSet {
    pub fn new(pattern: impl Into<String>, matches: Vec<SearchMatch>) -> Self {
        Self {
            pattern: pattern.into(),
            matches,
        }
    }

    /// Tab title for this result set
    pub fn title(&self) -> String {
        format!("search: {}", self.pattern)
    }

    /// Render the matches as `path:line: text` lines
    pub fn render(&self) -> String {
        self.matches
            .iter()
            .map(|m| format!("{}:{}: {}", m.path.display(), m.line, m.text))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// What a document is backed by
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    /// Never saved; labelled "new file N"
    Unsaved { label: String },
    /// Backed by a file on disk (path is absolute and resolved)
    FileBacked {
        path: PathBuf,
        encoding: String,
        offset: usize,
    },
    /// Read-only view over search results
    SearchResults(SearchResultSet),
}

/// One open document, exclusively owned by the registry
#[derive(Debug, Clone)]
pub struct DocumentHandle {
    pub(crate) id: DocumentId,
    source: DocumentSource,
    text: String,
    modified: bool,
    /// Bumped on every content change; auto-save only clears `modified`
    /// when the saved revision is still the latest
    revision: u64,
    /// A save-then-close is in flight for this document
    pub(crate) closing: bool,
}

impl DocumentHandle {
    pub(crate) fn new(id: DocumentId, source: DocumentSource, text: String) -> Self {
        Self {
            id,
            source,
            text,
            modified: false,
            revision: 0,
            closing: false,
        }
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn source(&self) -> &DocumentSource {
        &self.source
    }

    /// Backing file, if any
    pub fn backing_path(&self) -> Option<&Path> {
        match &self.source {
            DocumentSource::FileBacked { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Encoding of the backing file, if any
    pub fn encoding(&self) -> Option<&str> {
        match &self.source {
            DocumentSource::FileBacked { encoding, .. } => Some(encoding),
            _ => None,
        }
    }

    /// Last known cursor offset (0 for documents without a file)
    pub fn cursor_offset(&self) -> usize {
        match &self.source {
            DocumentSource::FileBacked { offset, .. } => *offset,
            _ => 0,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn is_closing(&self) -> bool {
        self.closing
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Label shown on the tab strip; dirty documents get a `*` marker
    pub fn display_title(&self) -> String {
        let name = match &self.source {
            DocumentSource::Unsaved { label } => label.clone(),
            DocumentSource::FileBacked { path, .. } => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.to_string_lossy().into_owned()),
            DocumentSource::SearchResults(results) => results.title(),
        };
        if self.modified {
            format!("*{name}")
        } else {
            name
        }
    }

    /// Text shown in the toolbar while this document is current.
    /// File-backed documents show their full path.
    pub fn toolbar_text(&self) -> String {
        match &self.source {
            DocumentSource::FileBacked { path, .. } => {
                let dirty = if self.modified { "*" } else { "" };
                format!("{dirty}{}", path.display())
            }
            _ => self.display_title(),
        }
    }

    /// Replace the buffer contents and mark the document dirty
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.modified = true;
        self.revision += 1;
    }

    pub fn set_modified(&mut self, modified: bool) {
        self.modified = modified;
    }

    /// Record the cursor position reported by the editor
    pub fn set_cursor_offset(&mut self, new_offset: usize) {
        if let DocumentSource::FileBacked { offset, .. } = &mut self.source {
            *offset = new_offset;
        }
    }

    /// Build the request handed to the saver for this document
    pub(crate) fn save_request(&self, shutdown: ShutdownContext) -> SaveRequest {
        SaveRequest {
            id: self.id,
            path: self.backing_path().map(Path::to_path_buf),
            encoding: self.encoding().map(str::to_string),
            offset: self.cursor_offset(),
            text: self.text.clone(),
            modified: self.modified,
            revision: self.revision,
            shutdown,
        }
    }
}
