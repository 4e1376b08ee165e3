use anyhow::{Context, Result};
use quire::cli;
use quire::document::FsSaver;
use quire::ledger::{LEDGER_FILE_NAME, YamlLedger};
use quire::tab::{CoordinatorParts, TabCoordinator};
use quire::view::Views;
use quire_config::defaults::PREFERENCES_FILE_NAME;
use quire_config::{FilePreferenceStore, PreferenceStore, Preferences};
use std::sync::Arc;
use tokio::runtime::Runtime;

/// Preference store that skips session restore for this launch only
struct SkipRestore(FilePreferenceStore);

impl PreferenceStore for SkipRestore {
    fn preferences(&self) -> &Preferences {
        self.0.preferences()
    }

    fn is_restore_last_session_enabled(&self) -> bool {
        false
    }

    fn set_last_active_position(&mut self, position: usize) -> Result<()> {
        self.0.set_last_active_position(position)
    }
}

fn main() -> Result<()> {
    // Process CLI arguments first (before logging init for cleaner output)
    let options = match cli::process_cli() {
        cli::CliResult::Exit(code) => {
            if code == 0 {
                return Ok(());
            }
            std::process::exit(code);
        }
        cli::CliResult::Continue(options) => options,
    };

    let config_dir = options
        .config_dir
        .clone()
        .unwrap_or_else(Preferences::config_dir);
    let store = FilePreferenceStore::open(config_dir.join(PREFERENCES_FILE_NAME))
        .context("Failed to load preferences")?;

    // CLI --log-level takes precedence, then RUST_LOG, then preferences
    quire::debug::init_log_bridge(
        options.log_level,
        store.preferences().log_level.map(|l| l.to_level_filter()),
    );
    log::info!("Starting quire {}", quire::VERSION);

    let ledger = YamlLedger::open(
        config_dir.join(LEDGER_FILE_NAME),
        store.preferences().recent_files_limit,
    )
    .context("Failed to load recent files")?;

    let preferences: Box<dyn PreferenceStore> = if options.no_restore {
        Box::new(SkipRestore(store))
    } else {
        Box::new(store)
    };

    // Saves run on this runtime's blocking pool
    let runtime = Runtime::new()?;
    let mut coordinator = TabCoordinator::start(CoordinatorParts {
        views: Views::headless(),
        preferences,
        ledger: Arc::new(ledger),
        saver: Arc::new(FsSaver),
        runtime: runtime.handle().clone(),
    });

    for file in &options.files {
        if let Err(e) = coordinator.open_or_focus(file, 0, quire::document::DEFAULT_ENCODING) {
            eprintln!("quire: {e}");
        }
    }

    let snapshot = coordinator.snapshot();
    if options.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        for tab in &snapshot.tabs {
            let marker = if snapshot.current == Some(tab.position) {
                ">"
            } else {
                " "
            };
            println!("{} {}: {}", marker, tab.position, tab.title);
        }
    }

    coordinator.close_all_and_exit();
    runtime.block_on(coordinator.run_until_idle());

    if !coordinator.is_terminated() {
        log::error!("Shutdown finished with tabs still open");
        std::process::exit(1);
    }
    log::info!("All tabs closed, exiting");
    Ok(())
}
