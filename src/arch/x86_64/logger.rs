//! Bridges the `log` facade onto the serial port.
//!
//! Kernel code reaches for `log::info!`/`log::warn!`/`log::error!`; this is
//! the one-time registration that makes those macros land on the same UART
//! as `serial_println!`, instead of silently doing nothing.

use log::{Level, LevelFilter, Log, Metadata, Record};

struct SerialLogger;

impl Log for SerialLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Trace
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            crate::serial_println!("[{:5}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: SerialLogger = SerialLogger;

pub fn init() {
    log::set_logger(&LOGGER)
        .map(|()| log::set_max_level(LevelFilter::Trace))
        .expect("logger already initialized");
}
