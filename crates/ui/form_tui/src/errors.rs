//! Error and panic reporting for the `signup` binary.
//!
//! Errors returned from `run` are rendered by color-eyre. A panic first hands
//! the terminal back (only when the interactive form had taken it over), then
//! logs the report to the log file and prints it to stderr.

use color_eyre::{Result, config::HookBuilder};
use tracing::error;

use crate::{config::get_data_dir, tui};

pub fn init() -> Result<()> {
    let (panic_hook, eyre_hook) = HookBuilder::default()
        .panic_section(format!(
            "The sign-up form crashed. Details are in the log file under {}",
            get_data_dir().display()
        ))
        .capture_span_trace_by_default(false)
        .display_location_section(false)
        .display_env_section(false)
        .try_into_hooks()?;
    eyre_hook.install()?;

    std::panic::set_hook(Box::new(move |panic_info| {
        if let Err(err) = tui::restore() {
            error!("Unable to restore the terminal: {:?}", err);
        }

        let report = panic_hook.panic_report(panic_info).to_string();
        error!(report = %strip_ansi_escapes::strip_str(&report), "panic");

        #[cfg(debug_assertions)]
        {
            better_panic::Settings::auto()
                .most_recent_first(false)
                .lineno_suffix(true)
                .verbosity(better_panic::Verbosity::Full)
                .create_panic_handler()(panic_info);
        }

        #[cfg(not(debug_assertions))]
        {
            let metadata = human_panic::metadata!();
            let dump = human_panic::handle_dump(&metadata, panic_info);
            if human_panic::print_msg(dump, &metadata).is_err() {
                eprintln!("{report}");
            }
        }

        std::process::exit(libc::EXIT_FAILURE);
    }));

    Ok(())
}
