// src/cli/packages.rs — Coin package listing and purchase preview

use crate::core::catalog::Catalog;

/// Print the catalog as a table (or JSON).
pub fn list_packages(catalog: &Catalog, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(catalog.list())?);
        return Ok(());
    }

    println!(
        "  {:<10} {:>7} {:>7} {:>9} {:>10}",
        "ID", "COINS", "BONUS", "PRICE", "COINS/USD"
    );
    for p in catalog.list() {
        let tag = if p.is_popular { "  (popular)" } else { "" };
        println!(
            "  {:<10} {:>7} {:>7} {:>9} {:>10.1}{}",
            p.id,
            p.coins,
            format!("+{}", p.bonus_coins),
            format!("${:.2}", p.price_usd),
            p.coins_per_usd(),
            tag,
        );
    }
    Ok(())
}

/// Credit `package_id` to `balance` and print the result.
pub fn buy(catalog: &Catalog, package_id: &str, balance: f64) -> anyhow::Result<()> {
    let package = catalog.get(package_id)?;
    let new_balance = catalog.purchase(balance, package_id)?;
    println!(
        "{}: +{} coins (+{} bonus) for ${:.2} -> balance {:.2}",
        package.id, package.coins, package.bonus_coins, package.price_usd, new_balance
    );
    Ok(())
}
