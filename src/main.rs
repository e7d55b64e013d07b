mod app;
mod cli;
mod config;
mod db;
mod logging;
mod paths;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    if let Err(err) = logging::init_logging() {
        eprintln!("airlog: file logging disabled: {err:#}");
    }
    let config = config::AppConfig::from_env()?;
    app::run(cli, &config)
}
