//! Log bridge for osm-geocoding hosts.
//!
//! Routes every `log::info!()` etc. to a log file in the temp directory:
//! `/tmp/osm_geocoding_debug.log` on Unix/macOS, `%TEMP%\osm_geocoding_debug.log`
//! on Windows. Keeping log output out of stdout stops it from interleaving
//! with the interactive prompt. When `RUST_LOG` is set, records are mirrored
//! to stderr as well.
//!
//! Level precedence: `--log-level` flag, then `RUST_LOG`, then the config
//! file's `log_level` (applied through [`apply_config_level`]).

use chrono::Local;
use log::{LevelFilter, Log, Metadata, Record};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

/// Set when the flag or `RUST_LOG` chose the level; config must not override it then.
static LEVEL_PINNED: AtomicBool = AtomicBool::new(false);

static LOGGER: OnceLock<BridgeLogger> = OnceLock::new();

struct BridgeLogger {
    file: Mutex<Option<File>>,
    mirror_stderr: bool,
}

impl Log for BridgeLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!(
            "[{}] [{:<5}] [{}] {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            record.level(),
            record.target(),
            record.args()
        );
        if let Some(file) = self.file.lock().as_mut() {
            // Logging must never take the host down; drop the line on I/O errors.
            let _ = file.write_all(line.as_bytes());
        }
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

/// Path of the log file the bridge writes to.
pub fn log_path() -> PathBuf {
    std::env::temp_dir().join("osm_geocoding_debug.log")
}

/// Parse `RUST_LOG` as a single level. Per-module directives are not supported;
/// anything that is not a bare level yields `None`.
fn rust_log_level() -> Option<LevelFilter> {
    std::env::var("RUST_LOG")
        .ok()
        .and_then(|v| v.trim().parse::<LevelFilter>().ok())
}

/// Install the bridge as the global `log` logger.
///
/// Safe to call more than once; later calls only adjust the level.
pub fn init_log_bridge(cli_level: Option<LevelFilter>) {
    let env_level = rust_log_level();
    let level = cli_level.or(env_level).unwrap_or(LevelFilter::Info);
    LEVEL_PINNED.store(cli_level.is_some() || env_level.is_some(), Ordering::SeqCst);

    let logger = LOGGER.get_or_init(|| {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path())
            .ok();
        BridgeLogger {
            file: Mutex::new(file),
            mirror_stderr: std::env::var_os("RUST_LOG").is_some(),
        }
    });

    // Err only means a logger is already installed (e.g. a second init).
    let _ = log::set_logger(logger);
    log::set_max_level(level);
    log::debug!("Log bridge initialised at level {}", level);
}

/// Apply the config file's level unless the flag or `RUST_LOG` pinned one.
pub fn apply_config_level(level: LevelFilter) {
    if LEVEL_PINNED.load(Ordering::SeqCst) {
        return;
    }
    log::set_max_level(level);
}
