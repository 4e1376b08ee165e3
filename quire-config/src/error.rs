//! Typed error variants for the quire-config crate.
//!
//! Loading and saving still return `anyhow::Result` so callers can attach
//! context; `ConfigError` values survive the conversion and can be recovered
//! with `downcast_ref` when a caller wants to match on the failure mode.
//!
//! ```rust,no_run
//! use quire_config::ConfigError;
//!
//! fn check_load_err(e: &anyhow::Error) {
//!     if let Some(cfg_err) = e.downcast_ref::<ConfigError>() {
//!         match cfg_err {
//!             ConfigError::Io(io) => eprintln!("I/O error: {io}"),
//!             ConfigError::Parse(p) => eprintln!("YAML parse error: {p}"),
//!             ConfigError::Validation(msg) => eprintln!("Validation: {msg}"),
//!         }
//!     }
//! }
//! ```

use thiserror::Error;

/// Errors that can occur when loading or saving preferences.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An I/O error occurred reading or writing the preferences file.
    #[error("I/O error reading preferences: {0}")]
    Io(#[from] std::io::Error),

    /// The preferences file contained YAML that could not be parsed.
    #[error("YAML parse error in preferences: {0}")]
    Parse(#[from] serde_yaml_ng::Error),

    /// A field value failed semantic validation.
    ///
    /// The inner string names the field and why it is invalid.
    #[error("Preference validation error: {0}")]
    Validation(String),
}
