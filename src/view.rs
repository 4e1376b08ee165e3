//! Passive views driven by the coordinator
//!
//! The tab strip, the content pager and the window chrome (toolbar title,
//! navigation drawer, tab menu) hold no tab state of their own. The
//! coordinator pushes snapshots and highlight changes into them, and they
//! report user input back as [`ViewEvent`]s.

use crate::document::DocumentId;
use serde::Serialize;
use std::path::PathBuf;

/// One row of the tab strip
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TabInfo {
    pub position: usize,
    pub id: DocumentId,
    pub title: String,
    pub path: Option<PathBuf>,
    pub modified: bool,
    pub closing: bool,
}

/// Full tab list as of the last structural or content change
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TabSnapshot {
    pub tabs: Vec<TabInfo>,
    /// Current position at publish time, if it is in range
    pub current: Option<usize>,
}

impl TabSnapshot {
    pub fn titles(&self) -> Vec<&str> {
        self.tabs.iter().map(|t| t.title.as_str()).collect()
    }
}

/// Scrollable strip of tab labels
pub trait TabStripView {
    /// Re-render the whole tab list
    fn set_tabs(&mut self, snapshot: &TabSnapshot);
    /// Highlight the tab at `position`
    fn set_current_tab(&mut self, position: usize);
}

/// Pager showing one document's content at a time
pub trait ContentPager {
    /// The set of pages changed
    fn set_pages(&mut self, snapshot: &TabSnapshot);
    /// Show the page at `position`
    fn set_current_page(&mut self, position: usize);
}

/// Toolbar and window-level widgets
pub trait ChromeView {
    fn set_title(&mut self, title: &str);
    fn open_navigation_drawer(&mut self) {}
    fn close_tab_menu(&mut self) {}
}

/// The views one coordinator drives
pub struct Views {
    pub tab_strip: Box<dyn TabStripView>,
    pub pager: Box<dyn ContentPager>,
    pub chrome: Box<dyn ChromeView>,
}

impl Views {
    pub fn new(
        tab_strip: Box<dyn TabStripView>,
        pager: Box<dyn ContentPager>,
        chrome: Box<dyn ChromeView>,
    ) -> Self {
        Self {
            tab_strip,
            pager,
            chrome,
        }
    }

    /// Views that only log what they are told, for hosts without a UI
    pub fn headless() -> Self {
        Self::new(Box::new(Headless), Box::new(Headless), Box::new(Headless))
    }
}

struct Headless;

impl TabStripView for Headless {
    fn set_tabs(&mut self, snapshot: &TabSnapshot) {
        log::trace!("tab strip: {:?}", snapshot.titles());
    }

    fn set_current_tab(&mut self, position: usize) {
        log::trace!("tab strip: highlight {}", position);
    }
}

impl ContentPager for Headless {
    fn set_pages(&mut self, snapshot: &TabSnapshot) {
        log::trace!("pager: {} pages", snapshot.tabs.len());
    }

    fn set_current_page(&mut self, position: usize) {
        log::trace!("pager: page {}", position);
    }
}

impl ChromeView for Headless {
    fn set_title(&mut self, title: &str) {
        log::debug!("toolbar: {}", title);
    }
}

/// Part of a tab-strip entry that was clicked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabControl {
    /// The label; focuses the tab
    Label,
    /// The close button
    Close,
}

/// Pager scroll state, reported but not acted on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollState {
    Idle,
    Dragging,
    Settling,
}

/// User input reported by the views
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    PageScrolled {
        position: usize,
        offset: f32,
        offset_px: i32,
    },
    /// The pager settled on a page
    PageSelected(usize),
    PageScrollStateChanged(ScrollState),
    TabMenuClicked {
        position: usize,
        control: TabControl,
    },
    NewTabClicked,
    NavigationClicked,
}
