use clap::Parser;
use zcp::config::Cli;
use zcp::Config;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Convert CLI args to Config - this validates immediately
    let config = Config::try_from(cli)?;

    // The handler only flips a flag; the copy loop polls it per chunk.
    zcp::cancel::install_termination_handler()?;

    zcp::commands::copy::run(&config)?;

    Ok(())
}
