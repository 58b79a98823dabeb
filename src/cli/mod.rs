// src/cli/mod.rs — CLI definition (clap derive)

pub mod call;
pub mod packages;
pub mod progress;
pub mod status;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "callmeter",
    about = "Per-second call metering and coin packages",
    version
)]
pub struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List purchasable coin packages
    Packages {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Credit a coin package to a balance
    Buy {
        /// Package id (see `callmeter packages`)
        package: String,
        /// Balance before the purchase
        #[arg(short, long, default_value = "0")]
        balance: f64,
    },
    /// Run a metered call until funds run out or Ctrl+C
    Call {
        /// Price per minute, in coins
        #[arg(short, long)]
        rate: f64,
        /// Opening balance, in coins
        #[arg(short, long)]
        balance: f64,
        /// Hang up after this many billed seconds (at least 1)
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        max_seconds: Option<u64>,
        /// Tick every 10ms instead of the configured interval
        #[arg(long)]
        fast: bool,
        /// Print the final record as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show config location, billing policy and catalog size
    Status,
}
