use anyhow::Result;
use clap::Parser;
use classgrid::cli::Cli;
use log::{error, info};

fn main() -> Result<()> {
    let cli = Cli::parse();
    classgrid::init_logger();

    info!("Starting classgrid");

    if let Err(err) = classgrid::run(cli) {
        error!("Command failed: {:?}", err);
        std::process::exit(1);
    }
    Ok(())
}
