//! Logging setup
//!
//! Console output plus, when a directory is given, a daily rotating
//! `dine-YYYY-MM-DD` file. `RUST_LOG` overrides the level.

use std::fs;
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, prelude::*};

/// Initialize logging
///
/// # Arguments
/// * `level` - Log level (e.g., "info", "debug", "warn")
/// * `json_format` - JSON lines instead of human-readable output
/// * `log_dir` - Optional directory for file logging
///
/// # Examples
/// ```no_run
/// use dine_client::logger::init_logger_with_file;
/// use std::path::Path;
///
/// init_logger_with_file("info", true, Some(Path::new("./logs")))?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn init_logger_with_file(
    level: &str,
    json_format: bool,
    log_dir: Option<&Path>,
) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = tracing_subscriber::registry().with(env_filter);

    let console_layer = if json_format {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };

    match log_dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            let file_log = RollingFileAppender::new(Rotation::DAILY, dir, "dine");
            let file_layer = if json_format {
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_writer(std::sync::Mutex::new(file_log))
                    .boxed()
            } else {
                fmt::layer()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_ansi(false)
                    .with_writer(std::sync::Mutex::new(file_log))
                    .boxed()
            };
            subscriber.with(console_layer).with(file_layer).try_init()?;
        }
        None => subscriber.with(console_layer).try_init()?,
    }

    Ok(())
}

/// Human-readable logging, optionally mirrored to a daily file
pub fn init_logger(level: &str, log_dir: Option<&Path>) -> anyhow::Result<()> {
    init_logger_with_file(level, false, log_dir)
}
