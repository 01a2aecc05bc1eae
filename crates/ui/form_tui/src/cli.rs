// src/cli.rs
use clap::{Parser, Subcommand};

use crate::config::{get_config_dir, get_data_dir};

#[derive(Parser, Debug)]
#[command(name = "signup", version = version(), about = "Sign-up form in the terminal")]
pub struct Cli {
    /// Tick rate, i.e. number of ticks per second
    #[arg(short, long, value_name = "FLOAT", default_value_t = 4.0)]
    pub tick_rate: f64,

    /// Frame rate, i.e. number of frames per second
    #[arg(short, long, value_name = "FLOAT", default_value_t = 30.0)]
    pub frame_rate: f64,

    #[command(subcommand)]
    pub cmd: Option<Cmd>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Cmd {
    /// Run the interactive form (default)
    Run,
    /// Validate a JSON object of sign-up values and print the messages
    Check {
        /// JSON object, e.g. '{"email":"a@b.co","age":21}'
        json: String,
    },
}

impl Cli {
    pub fn command(&self) -> Cmd {
        self.cmd.clone().unwrap_or(Cmd::Run)
    }
}

pub fn version() -> String {
    let author = clap::crate_authors!();

    let config_dir_path = get_config_dir().display().to_string();
    let data_dir_path = get_data_dir().display().to_string();

    format!(
        "\
{}

Authors: {author}

Config directory: {config_dir_path}
Data directory: {data_dir_path}",
        env!("CARGO_PKG_VERSION")
    )
}
