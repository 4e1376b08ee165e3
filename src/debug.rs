//! Logging for quire
//!
//! Every `log::info!()` and friends is routed to a log file in the system
//! temp directory (`/tmp/quire_debug.log` on most Unix systems) so that
//! stdout stays clean for the host's own output. When `RUST_LOG` is set,
//! records are mirrored to stderr as well.
//!
//! Level precedence: `--log-level` on the command line, then `RUST_LOG`,
//! then the `log_level` preference, then `info`.

use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::OnceLock;

/// Location of the log file
pub fn log_path() -> PathBuf {
    std::env::temp_dir().join("quire_debug.log")
}

/// Global logger state
struct LogBridge {
    level: log::LevelFilter,
    mirror_stderr: bool,
    file: Mutex<Option<File>>,
}

impl LogBridge {
    fn new(level: log::LevelFilter, mirror_stderr: bool) -> Self {
        let file = if level != log::LevelFilter::Off {
            // Silently run without a file if it can't be opened
            OpenOptions::new()
                .write(true)
                .truncate(true)
                .create(true)
                .open(log_path())
                .ok()
        } else {
            None
        };

        let bridge = LogBridge {
            level,
            mirror_stderr,
            file: Mutex::new(file),
        };
        bridge.write_raw(&format!(
            "{}\nquire session started at {} (level={})\n{}\n",
            "=".repeat(80),
            timestamp(),
            level,
            "=".repeat(80)
        ));
        bridge
    }

    fn write_raw(&self, msg: &str) {
        if let Some(file) = self.file.lock().as_mut() {
            let _ = file.write_all(msg.as_bytes());
            let _ = file.flush();
        }
    }
}

impl log::Log for LogBridge {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!(
            "[{}] [{:<5}] [{}] {}\n",
            timestamp(),
            record.level(),
            record.target(),
            record.args()
        );
        self.write_raw(&line);
        if self.mirror_stderr {
            eprint!("{line}");
        }
    }

    fn flush(&self) {
        if let Some(file) = self.file.lock().as_mut() {
            let _ = file.flush();
        }
    }
}

static BRIDGE: OnceLock<LogBridge> = OnceLock::new();

fn timestamp() -> String {
    chrono::Local::now()
        .format("%Y-%m-%d %H:%M:%S%.3f")
        .to_string()
}

/// Parse a plain `RUST_LOG` level such as `debug`. Directive lists are ignored.
fn parse_env_level(value: &str) -> Option<log::LevelFilter> {
    log::LevelFilter::from_str(value.trim()).ok()
}

/// Pick the effective level from the three sources
fn effective_level(
    cli_level: Option<log::LevelFilter>,
    env_value: Option<&str>,
    config_level: Option<log::LevelFilter>,
) -> log::LevelFilter {
    cli_level
        .or_else(|| env_value.and_then(parse_env_level))
        .or(config_level)
        .unwrap_or(log::LevelFilter::Info)
}

/// Install the logger. Later calls are ignored.
pub fn init_log_bridge(
    cli_level: Option<log::LevelFilter>,
    config_level: Option<log::LevelFilter>,
) {
    let env_value = std::env::var("RUST_LOG").ok();
    let level = effective_level(cli_level, env_value.as_deref(), config_level);
    let bridge = BRIDGE.get_or_init(|| LogBridge::new(level, env_value.is_some()));
    if log::set_logger(bridge).is_ok() {
        log::set_max_level(bridge.level);
    }
}
