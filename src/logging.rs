//! Process-wide logging, installed explicitly once at program start.
//!
//! Console output goes through `env_logger` (`RUST_LOG` overrides the
//! default `info` level). [`init_root_logger`] additionally appends every
//! record at info and above to a normal log file and every error to a
//! separate error file.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::time::Instant;

use env_logger::{Env, Target, WriteStyle};
use log::{info, LevelFilter, Log, Metadata, Record};

use crate::error::Result;

/// Console-only logging, as used by the feature generator.
pub fn init_console() -> Result<()> {
    let logger = console_builder().build();
    let max = logger.filter();
    log::set_boxed_logger(Box::new(logger))?;
    log::set_max_level(max);
    Ok(())
}

/// Console logging plus `{log_dir}/{normal}` (info+) and `{log_dir}/{error}`
/// (error only). Files are opened for append and `log_dir` is created if
/// needed.
pub fn init_root_logger(log_dir: &Path, normal: &str, error: &str) -> Result<()> {
    std::fs::create_dir_all(log_dir)?;

    let console = console_builder().build();
    let normal = file_logger(&log_dir.join(normal), LevelFilter::Info)?;
    let error = file_logger(&log_dir.join(error), LevelFilter::Error)?;

    let max = [console.filter(), normal.filter(), error.filter()]
        .into_iter()
        .max()
        .unwrap_or(LevelFilter::Info);
    log::set_boxed_logger(Box::new(RootLogger {
        sinks: vec![console, normal, error],
    }))?;
    log::set_max_level(max);
    Ok(())
}

fn console_builder() -> env_logger::Builder {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
}

fn file_logger(path: &Path, level: LevelFilter) -> Result<env_logger::Logger> {
    let file: File = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(env_logger::Builder::new()
        .filter_level(level)
        .target(Target::Pipe(Box::new(file)))
        .write_style(WriteStyle::Never)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - {} - {} - {}",
                buf.timestamp(),
                record.level(),
                record.file().unwrap_or("?"),
                record.target(),
                record.args()
            )
        })
        .build())
}

/// Fans each record out to every sink whose filter accepts it.
struct RootLogger {
    sinks: Vec<env_logger::Logger>,
}

impl Log for RootLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.sinks.iter().any(|s| s.enabled(metadata))
    }

    fn log(&self, record: &Record) {
        for sink in &self.sinks {
            if sink.matches(record) {
                sink.log(record);
            }
        }
    }

    fn flush(&self) {
        for sink in &self.sinks {
            sink.flush();
        }
    }
}

// ---------------------------------------------------------------------------
// Scoped timer
// ---------------------------------------------------------------------------

struct BlockTimer<'a> {
    name: &'a str,
    started: Instant,
}

impl Drop for BlockTimer<'_> {
    fn drop(&mut self) {
        info!("[{}] done in {:.2?}", self.name, self.started.elapsed());
    }
}

/// Run `body`, logging `[name] start` before and the elapsed time after.
/// The elapsed line is logged on every exit path, including errors and
/// panics.
pub fn time_block<T>(name: &str, body: impl FnOnce() -> T) -> T {
    info!("[{name}] start");
    let _timer = BlockTimer {
        name,
        started: Instant::now(),
    };
    body()
}
