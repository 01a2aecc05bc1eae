use color_eyre::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::{LOG_ENV, LOG_FILE, get_data_dir};

/// Install the file subscriber.
///
/// Stdout belongs to the terminal UI, so everything goes to
/// `<data dir>/form_tui.log`. The filter is taken from `RUST_LOG`, then from
/// `FORM_TUI_LOGLEVEL`, and falls back to `info` for this crate and `forms`.
/// Keep the returned guard alive until exit or buffered lines are lost.
pub fn init() -> Result<WorkerGuard> {
    let directory = get_data_dir();
    std::fs::create_dir_all(&directory)?;

    let file_appender = tracing_appender::rolling::never(&directory, LOG_FILE.as_str());
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_from_env(LOG_ENV.as_str()))
        .or_else(|_| {
            EnvFilter::try_new(format!("{}=info,forms=info", env!("CARGO_CRATE_NAME")))
        })?;

    let file_subscriber = fmt::layer()
        .with_file(true)
        .with_line_number(true)
        .with_writer(non_blocking)
        .with_target(false)
        .with_ansi(false)
        .with_filter(env_filter);

    tracing_subscriber::registry()
        .with(file_subscriber)
        .with(ErrorLayer::default())
        .try_init()?;

    Ok(guard)
}
