// src/cli/status.rs — Config and policy summary

use crate::infra::config::Config;
use crate::infra::paths;

/// Display where config comes from and the active billing policy.
pub fn show_status(config: &Config, config_override: Option<&str>) -> anyhow::Result<()> {
    println!("callmeter v{}", env!("CARGO_PKG_VERSION"));
    println!();

    match config_override {
        Some(path) => println!("  Config:     {} (--config)", path),
        None => {
            let path = paths::config_file_path();
            if path.exists() {
                println!("  Config:     {} (loaded)", path.display());
            } else {
                println!("  Config:     (using defaults)");
            }
        }
    }

    let b = &config.billing;
    println!();
    println!("  Billing:");
    println!("    Tick interval:     {}ms", b.tick_interval_ms);
    println!("    Termination floor: {:.2}", b.termination_floor);
    println!("    Low balance at:    {:.1} min of talk time", b.low_balance_minutes);

    let catalog = config.catalog()?;
    println!();
    println!(
        "  Catalog:    {} package(s){}",
        catalog.len(),
        if config.packages.is_empty() {
            " (built-in)"
        } else {
            ""
        }
    );
    Ok(())
}
