//! Shared shutdown state
//!
//! `ShutdownContext` replaces global "exiting" flags. The coordinator owns
//! it, clones travel with every save request, and the flags only ever go
//! from false to true.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
struct ShutdownFlags {
    auto_save_disabled: AtomicBool,
    exiting: AtomicBool,
}

#[derive(Debug, Clone, Default)]
pub struct ShutdownContext {
    flags: Arc<ShutdownFlags>,
}

impl ShutdownContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the application as exiting and stop auto-save
    pub fn begin(&self) {
        self.flags.auto_save_disabled.store(true, Ordering::SeqCst);
        self.flags.exiting.store(true, Ordering::SeqCst);
    }

    pub fn is_exiting(&self) -> bool {
        self.flags.exiting.load(Ordering::SeqCst)
    }

    pub fn is_auto_save_disabled(&self) -> bool {
        self.flags.auto_save_disabled.load(Ordering::SeqCst)
    }
}

/// Where the coordinator is in its lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownPhase {
    Running,
    /// Closing documents one at a time; `closed` counts completions so far
    Exiting { closed: usize },
    /// Every document is closed; the host should exit the process
    Terminated,
}
