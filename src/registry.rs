//! Ordered set of open documents
//!
//! Positions are contiguous `0..count`. Removing a document shifts every
//! later position down by one. Each document also carries a `DocumentId`
//! that does not move, which is how asynchronous completions find it.

use crate::document::{DocumentHandle, DocumentId, DocumentSource};
use std::path::Path;

#[derive(Debug)]
pub struct DocumentRegistry {
    documents: Vec<DocumentHandle>,
    next_id: DocumentId,
}

impl DocumentRegistry {
    pub fn new() -> Self {
        Self {
            documents: Vec::new(),
            next_id: 1,
        }
    }

    /// Append a new document and return its position
    pub fn create_document(&mut self, source: DocumentSource, text: String) -> usize {
        if let DocumentSource::FileBacked { path, .. } = &source {
            debug_assert!(
                self.find_by_path(path).is_none(),
                "duplicate document for {}",
                path.display()
            );
        }
        let id = self.next_id;
        self.next_id += 1;
        self.documents.push(DocumentHandle::new(id, source, text));
        self.documents.len() - 1
    }

    /// Remove the document at `position`, shifting later ones down
    pub fn remove_document(&mut self, position: usize) -> Option<DocumentHandle> {
        if position < self.documents.len() {
            Some(self.documents.remove(position))
        } else {
            None
        }
    }

    pub fn count(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&DocumentHandle> {
        self.documents.get(position)
    }

    pub fn get_mut(&mut self, position: usize) -> Option<&mut DocumentHandle> {
        self.documents.get_mut(position)
    }

    /// Current position of the document with `id`
    pub fn position_of(&self, id: DocumentId) -> Option<usize> {
        self.documents.iter().position(|d| d.id == id)
    }

    /// Position of the document backed by `path` (already resolved)
    pub fn find_by_path(&self, path: &Path) -> Option<usize> {
        self.documents
            .iter()
            .position(|d| d.backing_path() == Some(path))
    }

    /// Number of documents with no backing file, used to number "new file N"
    pub fn count_unsaved(&self) -> usize {
        self.documents
            .iter()
            .filter(|d| matches!(d.source(), DocumentSource::Unsaved { .. }))
            .count()
    }

    /// Number of documents with a save-then-close in flight
    pub fn count_closing(&self) -> usize {
        self.documents.iter().filter(|d| d.closing).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DocumentHandle> {
        self.documents.iter()
    }
}

impl Default for DocumentRegistry {
    fn default() -> Self {
        Self::new()
    }
}
