//! `log` backend that writes to the kernel console
//!
//! The console is registered once at boot. Records logged before that
//! are dropped.

use log::{Level, Metadata, Record, SetLoggerError};
use spin::Once;

use crate::config::Config;
use crate::console::{Console, ConsoleWriter};

/// Logger writing `[LEVEL] target: message` lines.
pub struct KernelLogger {
    console: Once<&'static dyn Console>,
}

impl KernelLogger {
    const fn new() -> Self {
        Self {
            console: Once::new(),
        }
    }
}

fn tag(level: Level) -> &'static str {
    match level {
        Level::Error => "ERROR",
        Level::Warn => "WARN ",
        Level::Info => "INFO ",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    }
}

impl log::Log for KernelLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if let Some(console) = self.console.get() {
            use core::fmt::Write;
            let _ = writeln!(
                ConsoleWriter(*console),
                "[{}] {}: {}",
                tag(record.level()),
                record.target(),
                record.args()
            );
        }
    }

    fn flush(&self) {}
}

static LOGGER: KernelLogger = KernelLogger::new();

/// Install the console logger at `config.log_level`.
///
/// Fails if another logger was installed first; the console and level
/// are then left alone.
pub fn init(console: &'static dyn Console, config: &Config) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER)?;
    LOGGER.console.call_once(|| console);
    log::set_max_level(config.log_level);
    Ok(())
}
