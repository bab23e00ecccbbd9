use godot::prelude::*;
use log::{Level, LevelFilter, Log, Metadata, Record};

/// Routes `log` records to the Godot output panel
pub struct GodotLogger;

static LOGGER: GodotLogger = GodotLogger;

impl Log for GodotLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        match record.level() {
            Level::Error => godot_error!("{}", record.args()),
            Level::Warn => godot_warn!("{}", record.args()),
            _ => godot_print!("{}", record.args()),
        }
    }

    fn flush(&self) {}
}

/// Install the Godot logger. Only the first call has any effect.
pub fn init(level: LevelFilter) {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}
