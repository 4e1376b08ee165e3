//! Command-line interface for quire.
//!
//! Handles argument parsing and the `recent` subcommand. Everything else is
//! passed to the host as [`RuntimeOptions`].

use crate::ledger::{LEDGER_FILE_NAME, RecentFilesLedger, YamlLedger, ledger_path};
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// quire - tabbed document session coordinator
#[derive(Parser)]
#[command(name = "quire")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Files to open (an already open file is focused instead)
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// Do not reopen the files from the last session
    #[arg(long)]
    pub no_restore: bool,

    /// Set debug log level (overrides preferences and RUST_LOG)
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevelArg>,

    /// Directory holding preferences and the recent-files ledger
    #[arg(long, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Print the tab list as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log level argument for CLI
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum LogLevelArg {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevelArg {
    /// Convert to `log::LevelFilter`
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevelArg::Off => log::LevelFilter::Off,
            LogLevelArg::Error => log::LevelFilter::Error,
            LogLevelArg::Warn => log::LevelFilter::Warn,
            LogLevelArg::Info => log::LevelFilter::Info,
            LogLevelArg::Debug => log::LevelFilter::Debug,
            LogLevelArg::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List recently opened files, most recent first
    Recent {
        /// Only list files that would be reopened on the next launch
        #[arg(long)]
        active: bool,
    },
}

/// Runtime options passed from CLI to the host
#[derive(Clone, Debug, Default)]
pub struct RuntimeOptions {
    /// Files to open after startup
    pub files: Vec<PathBuf>,
    /// Skip session restore for this launch
    pub no_restore: bool,
    /// Log level override from CLI
    pub log_level: Option<log::LevelFilter>,
    /// Config directory override
    pub config_dir: Option<PathBuf>,
    /// Print the tab list as JSON
    pub json: bool,
}

/// Result of CLI processing
pub enum CliResult {
    /// Continue with normal startup
    Continue(RuntimeOptions),
    /// Exit with the given code (subcommand completed)
    Exit(i32),
}

/// Process CLI arguments and handle subcommands
pub fn process_cli() -> CliResult {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Recent { active }) => {
            let result = print_recent_files(cli.config_dir.as_deref(), active);
            if let Err(e) = &result {
                eprintln!("quire: error: {e:#}");
            }
            CliResult::Exit(if result.is_ok() { 0 } else { 1 })
        }
        None => CliResult::Continue(RuntimeOptions {
            files: cli.files,
            no_restore: cli.no_restore,
            log_level: cli.log_level.map(|l| l.to_level_filter()),
            config_dir: cli.config_dir,
            json: cli.json,
        }),
    }
}

fn print_recent_files(config_dir: Option<&Path>, active_only: bool) -> Result<()> {
    let path = match config_dir {
        Some(dir) => dir.join(LEDGER_FILE_NAME),
        None => ledger_path(),
    };
    let ledger = YamlLedger::open(path, usize::MAX)?;
    let entries = if active_only {
        ledger.list_active_entries()?
    } else {
        ledger.list_entries()?
    };
    for entry in entries {
        let marker = if entry.active { "*" } else { " " };
        println!(
            "{} {} (offset {}, {})",
            marker,
            entry.path.display(),
            entry.offset,
            entry.encoding
        );
    }
    Ok(())
}
