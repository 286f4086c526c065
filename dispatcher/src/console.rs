// dispatcher/src/console.rs

//! Log output on stderr, one coloured line per record.
//!
//! stdout is kept for the prompts, memory dumps and the final report.

use std::io::{self, Write};
use log::{Level, LevelFilter, Log, Metadata, Record};

const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const BLUE: &str = "\x1b[34m";
const GRAY: &str = "\x1b[37m";
const RESET: &str = "\x1b[0m";

struct Logger;

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mod_path = record
            .module_path_static()
            .or_else(|| record.module_path())
            .unwrap_or("<n/a>");
        let color = match record.level() {
            Level::Error => RED,
            Level::Warn => YELLOW,
            Level::Info => GREEN,
            Level::Debug => BLUE,
            Level::Trace => GRAY,
        };
        // nowhere left to report a failing stderr
        let _ = writeln!(
            io::stderr().lock(),
            "{}[ {:>5} ] [{}] {}{}",
            color,
            record.level(),
            mod_path,
            record.args(),
            RESET
        );
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
    }
}

static LOGGER: Logger = Logger;

/// Install the console logger. Later calls only change the level.
pub fn init(level: LevelFilter) {
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(level);
}

/// Level for `-v` repeated `verbose` times, or errors only when `quiet`.
pub fn level_for(verbose: u64, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}
