//! Terminal host for `forms`.
//!
//! `components::GenericForm` is the reusable container; `signup` and `app`
//! put it to work as a small sign-up program.

pub mod action;
pub mod app;
pub mod cli;
pub mod components;
pub mod config;
pub mod errors;
pub mod logging;
pub mod signup;
pub mod tui;

use color_eyre::Result;
use tracing::info;

use crate::{
    app::App,
    cli::{Cli, Cmd},
    config::Config,
};

/// Run the command selected on the command line. Returns the process exit
/// code.
pub async fn run(cli: Cli) -> Result<i32> {
    crate::errors::init()?;
    config::ensure_data_and_config_dirs_exist()?;
    let _guard = crate::logging::init()?;

    match cli.command() {
        Cmd::Run => {
            let config = Config::new()?;
            info!(title = %config.form.title, "starting sign-up form");
            let mut app = App::new(&cli, config)?;
            app.run().await?;
            Ok(0)
        }
        Cmd::Check { json } => {
            let report = signup::check(&json)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(if report.is_valid() { 0 } else { 1 })
        }
    }
}
