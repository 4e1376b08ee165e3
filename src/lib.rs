//! quire: tab lifecycle and session coordination for single-window editors
//!
//! - [`tab::TabCoordinator`] owns the open documents and keeps the tab
//!   strip, the content pager and the toolbar in step with them.
//! - [`ledger`] remembers recently opened files so a session can be
//!   restored on the next launch.
//! - [`document::save`] runs saves off the UI thread and reports back.
//!
//! # Threading
//!
//! The coordinator is owned by one thread and is never shared. Background
//! saves run on a tokio runtime and send their completions over a channel;
//! the owner applies them with `poll_events`, `handle_event` or
//! `run_until_idle`, so all tab state changes happen on the owning thread.

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod debug;
pub mod document;
pub mod error;
pub mod ledger;
pub mod registry;
pub mod shutdown;
pub mod tab;
pub mod view;

pub use error::{CoordinatorError, Result};
pub use tab::{CoordinatorEvent, CoordinatorParts, TabCoordinator};
