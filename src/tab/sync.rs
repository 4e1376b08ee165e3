//! Current-tab changes and view updates

use super::TabCoordinator;
use crate::document::{DocumentHandle, DocumentSource};
use crate::error::{CoordinatorError, Result};
use crate::view::{TabControl, ViewEvent};

impl TabCoordinator {
    /// Make the tab at `index` current
    ///
    /// Moves the pager and the strip highlight, then refreshes the toolbar.
    pub fn set_current_tab(&mut self, index: usize) -> Result<()> {
        if index >= self.registry.count() {
            return Err(self.invalid_position(index));
        }
        self.activate(index);
        Ok(())
    }

    /// A document's title or dirty state changed
    ///
    /// Re-renders the tab strip and refreshes the toolbar title. The tab
    /// list itself is unchanged.
    pub fn on_document_changed(&mut self, index: usize) {
        log::trace!("Document at tab {} changed", index);
        self.publish_tab_list();
        self.update_toolbar();
    }

    /// Mutate the document at `position` and propagate the change
    pub fn edit_document<F>(&mut self, position: usize, edit: F) -> Result<()>
    where
        F: FnOnce(&mut DocumentHandle),
    {
        let count = self.registry.count();
        let doc = self
            .registry
            .get_mut(position)
            .ok_or(CoordinatorError::InvalidPosition { position, count })?;
        edit(doc);
        self.on_document_changed(position);
        Ok(())
    }

    /// Route user input from the views
    pub fn handle_view_event(&mut self, event: ViewEvent) -> Result<()> {
        match event {
            ViewEvent::PageScrolled { .. } | ViewEvent::PageScrollStateChanged(_) => Ok(()),
            ViewEvent::PageSelected(position) => {
                if position >= self.registry.count() {
                    return Err(self.invalid_position(position));
                }
                // The pager already shows this page; only follow it
                self.current = Some(position);
                self.views.tab_strip.set_current_tab(position);
                Ok(())
            }
            ViewEvent::TabMenuClicked { position, control } => match control {
                TabControl::Close => self.close_tab(position),
                TabControl::Label => {
                    self.views.chrome.close_tab_menu();
                    self.set_current_tab(position)
                }
            },
            ViewEvent::NewTabClicked => self.new_tab().map(|_| ()),
            ViewEvent::NavigationClicked => {
                self.views.chrome.open_navigation_drawer();
                Ok(())
            }
        }
    }

    /// Point pager, strip and toolbar at `index` (already validated)
    pub(super) fn activate(&mut self, index: usize) {
        self.current = Some(index);
        self.views.pager.set_current_page(index);
        self.views.tab_strip.set_current_tab(index);
        self.update_toolbar();
    }

    /// The tab list gained or lost a member
    ///
    /// Publishes the new list and, outside shutdown, replaces an emptied
    /// registry with a blank tab.
    pub(super) fn structure_changed(&mut self) {
        self.publish_structure();
        if self.registry.is_empty() && !self.shutdown.is_exiting() {
            log::info!("Last tab closed, opening a blank tab");
            let label = self.untitled_label(self.registry.count() + 1);
            self.append_and_activate(DocumentSource::Unsaved { label }, String::new());
        }
    }

    pub(super) fn publish_structure(&mut self) {
        let snapshot = self.snapshot();
        self.views.pager.set_pages(&snapshot);
        self.views.tab_strip.set_tabs(&snapshot);
    }

    pub(super) fn publish_tab_list(&mut self) {
        let snapshot = self.snapshot();
        self.views.tab_strip.set_tabs(&snapshot);
    }

    /// Push the current document's title, skipping unchanged titles
    fn update_toolbar(&mut self) {
        let Some(doc) = self.current.and_then(|c| self.registry.get(c)) else {
            return;
        };
        let title = doc.toolbar_text();
        if self.toolbar_title.as_deref() == Some(title.as_str()) {
            return;
        }
        self.views.chrome.set_title(&title);
        self.toolbar_title = Some(title);
    }
}
