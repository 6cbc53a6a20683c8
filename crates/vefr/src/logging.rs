//! Logging setup.
//!
//! Everything in the crate logs through the `log` facade. [`init_logger`]
//! installs an `env_logger` backend (filter from `RUST_LOG`, `info` when
//! unset) wrapped in a thin logger that also keeps the most recent warnings
//! and errors in a ring buffer for the diagnostics snapshot.
//!
//! Every log call writes before it returns. [`fatal`] relies on that: it
//! logs, flushes, and only then exits.

use std::collections::VecDeque;
use std::sync::{Mutex, OnceLock};

use log::Log;

const RING_CAPACITY: usize = 200;

/// A captured warning or error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedLog {
    pub level: log::Level,
    pub target: String,
    pub message: String,
}

static LOG_RING: Mutex<VecDeque<CapturedLog>> = Mutex::new(VecDeque::new());

fn capture(record: &log::Record) {
    if record.level() > log::Level::Warn {
        return;
    }
    let Ok(mut ring) = LOG_RING.lock() else {
        return;
    };
    if ring.len() >= RING_CAPACITY {
        ring.pop_front();
    }
    ring.push_back(CapturedLog {
        level: record.level(),
        target: record.target().to_string(),
        message: record.args().to_string(),
    });
}

/// Take up to `max` captured entries, oldest first.
pub fn drain_captured(max: usize) -> Vec<CapturedLog> {
    let Ok(mut ring) = LOG_RING.lock() else {
        return Vec::new();
    };
    let n = ring.len().min(max);
    ring.drain(..n).collect()
}

struct PipelineLogger {
    inner: env_logger::Logger,
}

impl Log for PipelineLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.inner.enabled(metadata) || metadata.level() <= log::Level::Warn
    }

    fn log(&self, record: &log::Record) {
        if self.inner.enabled(record.metadata()) {
            self.inner.log(record);
        }
        capture(record);
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

static LOGGER: OnceLock<PipelineLogger> = OnceLock::new();

/// Install the logger. Safe to call more than once; later calls are no-ops.
pub fn init_logger() {
    let inner = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .build();
    let max_level = inner.filter();

    let logger = LOGGER.get_or_init(|| PipelineLogger { inner });
    if log::set_logger(logger).is_err() {
        log::debug!("logger already installed");
        return;
    }
    log::set_max_level(max_level.max(log::LevelFilter::Warn));
}

/// Log `message` at error level, flush, and terminate with status 1.
///
/// Reserved for unrecoverable startup failures.
pub fn fatal(message: impl std::fmt::Display) -> ! {
    log::error!("{message}");
    log::logger().flush();
    std::process::exit(1)
}
