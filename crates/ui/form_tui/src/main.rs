use clap::Parser;
use color_eyre::Result;
use form_tui::cli::Cli;

#[tokio::main]
pub async fn main() -> Result<()> {
    let args = Cli::parse();
    let code = form_tui::run(args).await?;
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
