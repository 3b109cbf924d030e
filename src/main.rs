use anyhow::Result;
use clap::Parser;
use log::info;

mod cli;

use cli::{Cli, Commands};

fn init_logging(to_stderr: bool) -> Result<()> {
    let mut builder = env_logger::Builder::from_default_env();
    if !to_stderr {
        // Truncated on each run
        let log_file = std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open("view-navigator.log")?;
        builder.target(env_logger::Target::Pipe(Box::new(log_file)));
    }
    builder.init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.stderr)?;
    info!("Starting view-navigator");

    match cli.command {
        Commands::Run(args) => cli::run_command(args).await,
        Commands::Views => cli::views_command(),
    }
}
