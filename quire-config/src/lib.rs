//! Preference system for the quire tab coordinator.
//!
//! This crate provides loading, saving, and default values for the user
//! preferences the coordinator consults at startup and shutdown:
//!
//! - `Preferences`: the YAML-backed preference document
//! - `PreferenceStore`: the narrow read/write contract the coordinator depends on
//! - `FilePreferenceStore`: a store that persists every write to disk
//! - `ConfigError`: typed failures for preference I/O

pub mod defaults;
pub mod error;
pub mod preferences;
pub mod store;

pub use error::ConfigError;
pub use preferences::{LogLevel, Preferences};
pub use store::{FilePreferenceStore, PreferenceStore};
