//! Sets up `tracing` output for the command line app.

use std::{fs::OpenOptions, path::Path, sync::Arc};

use tracing_subscriber::{EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

/// Log to stderr at the `info` level, or as set by `RUST_LOG`, and at the
/// `debug` level to `debug_log_path` if given.
///
/// # Errors
///
/// Returns an error if the debug log file cannot be opened.
pub fn init_logging(debug_log_path: Option<&Path>) -> Result<(), std::io::Error> {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let console_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(std::io::stderr)
        .with_filter(console_filter);

    let debug_log = match debug_log_path {
        Some(path) => {
            let log_file = OpenOptions::new().create(true).append(true).open(path)?;

            Some(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_ansi(false)
                    .with_writer(Arc::new(log_file))
                    .with_filter(filter::LevelFilter::DEBUG),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console_log)
        .with(debug_log)
        .init();

    Ok(())
}
