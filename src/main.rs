// src/main.rs — callmeter entry point

use clap::Parser;

use callmeter::cli::{Cli, Commands};
use callmeter::infra::config::Config;
use callmeter::infra::logger;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load config (falls back to defaults if no config.toml)
    let config = if let Some(ref path) = cli.config {
        Config::load_from(std::path::Path::new(path))?
    } else {
        Config::load()?
    };

    // Respects RUST_LOG over the configured level
    logger::init_logging(&config.logging.level);

    match cli.command {
        Commands::Packages { json } => {
            callmeter::cli::packages::list_packages(&config.catalog()?, json)
        }
        Commands::Buy { package, balance } => {
            callmeter::cli::packages::buy(&config.catalog()?, &package, balance)
        }
        Commands::Call {
            rate,
            balance,
            max_seconds,
            fast,
            json,
        } => callmeter::cli::call::run_call(&config, rate, balance, max_seconds, fast, json).await,
        Commands::Status => callmeter::cli::status::show_status(&config, cli.config.as_deref()),
    }
}
