use std::fs::{self, OpenOptions};
use std::path::Path;
use std::str::FromStr;

use crate::config::{LogConfig, LogMode};
use crate::error::ConfigError;

/// Installs the global logger. Stdout carries the protocol, so logs go to
/// stderr or a dated file, never stdout.
pub fn init_logging(config: &LogConfig, log_dir: &Path) -> Result<(), ConfigError> {
    if config.mode == LogMode::Off {
        return Ok(());
    }

    let level = log::LevelFilter::from_str(&config.level)
        .map_err(|_| ConfigError::LogLevel(config.level.clone()))?;

    let mut dispatch = fern::Dispatch::new()
        .level(level)
        .level_for("reqwest", log::LevelFilter::Warn)
        .format(|out, message, record| {
            let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
            let module = record.module_path().unwrap_or(record.target());
            let line = record
                .line()
                .map(|line| line.to_string())
                .unwrap_or_else(|| "?".to_string());
            out.finish(format_args!(
                "[{}] [{}] [{}:{}] [{}]",
                record.level(),
                timestamp,
                module,
                line,
                message
            ))
        });

    match config.mode {
        LogMode::File => match create_log_file(log_dir) {
            Ok(file) => dispatch = dispatch.chain(file),
            Err(err) => {
                eprintln!("Failed to open log file: {}", err);
                dispatch = dispatch.chain(std::io::stderr());
            }
        },
        _ => dispatch = dispatch.chain(std::io::stderr()),
    }

    dispatch
        .apply()
        .map_err(|e| ConfigError::Logging(e.to_string()))
}

fn create_log_file(log_dir: &Path) -> std::io::Result<fs::File> {
    fs::create_dir_all(log_dir)?;

    let date = chrono::Local::now().format("%Y-%m-%d").to_string();
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join(format!("{}.log", date)))
}
