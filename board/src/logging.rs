//! `log` backend writing formatted records to a board output sink,
//! typically the console UART.

use alloc::format;
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use spin::Mutex;

/// Writes one formatted log line.
pub type Sink = fn(&str);

pub struct BoardLogger {
    sink: Mutex<Option<Sink>>,
}

impl BoardLogger {
    pub const fn new() -> Self {
        Self {
            sink: Mutex::new(None),
        }
    }

    /// Route records to `sink`. Records logged before are dropped.
    pub fn set_sink(&self, sink: Sink) {
        *self.sink.lock() = Some(sink);
    }
}

impl Default for BoardLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Log for BoardLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let Some(sink) = *self.sink.lock() else {
            return;
        };
        let color = match record.level() {
            Level::Error => 31,
            Level::Warn => 93,
            Level::Info => 37,
            Level::Debug => 32,
            Level::Trace => 90,
        };
        sink(&format!(
            "\x1b[{}m{:5}\x1b[0m [{}] {}\r\n",
            color,
            record.level(),
            record.target(),
            record.args()
        ));
    }

    fn flush(&self) {}
}

static LOGGER: BoardLogger = BoardLogger::new();

/// Install the board logger, writing records up to `level` to `sink`.
pub fn init(sink: Sink, level: LevelFilter) -> Result<(), SetLoggerError> {
    LOGGER.set_sink(sink);
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}
