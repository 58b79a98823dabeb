// src/core/catalog.rs — Coin package catalog and purchase credit

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::infra::errors::{MeterError, Result};

/// A purchasable coin bundle. Immutable once in a catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinPackage {
    pub id: String,
    pub coins: u32,
    #[serde(default)]
    pub bonus_coins: u32,
    pub price_usd: f64,
    #[serde(default)]
    pub is_popular: bool,
}

impl CoinPackage {
    pub fn new(id: impl Into<String>, coins: u32, bonus_coins: u32, price_usd: f64) -> Self {
        Self {
            id: id.into(),
            coins,
            bonus_coins,
            price_usd,
            is_popular: false,
        }
    }

    pub fn popular(mut self) -> Self {
        self.is_popular = true;
        self
    }

    /// Coins added to the balance on purchase, bonus included.
    pub fn total_credited(&self) -> u64 {
        self.coins as u64 + self.bonus_coins as u64
    }

    pub fn coins_per_usd(&self) -> f64 {
        self.total_credited() as f64 / self.price_usd
    }
}

/// Balance after crediting `package`. Pure arithmetic; the payment itself
/// has already succeeded by the time this is called.
pub fn purchase(balance: f64, package: &CoinPackage) -> f64 {
    balance + package.total_credited() as f64
}

/// Ordered, id-unique list of coin packages.
#[derive(Debug, Clone)]
pub struct Catalog {
    packages: Vec<CoinPackage>,
}

impl Catalog {
    /// Build a catalog, rejecting empty ids, duplicates, zero coins and
    /// non-positive prices.
    pub fn new(packages: Vec<CoinPackage>) -> Result<Self> {
        let mut seen = HashSet::new();
        for p in &packages {
            if p.id.trim().is_empty() {
                return Err(MeterError::Config("coin package with empty id".into()));
            }
            if !seen.insert(p.id.clone()) {
                return Err(MeterError::Config(format!(
                    "duplicate coin package id '{}'",
                    p.id
                )));
            }
            if p.coins == 0 {
                return Err(MeterError::Config(format!(
                    "coin package '{}' must grant at least one coin",
                    p.id
                )));
            }
            if !p.price_usd.is_finite() || p.price_usd <= 0.0 {
                return Err(MeterError::Config(format!(
                    "coin package '{}' has invalid price {}",
                    p.id, p.price_usd
                )));
            }
        }
        Ok(Self { packages })
    }

    /// The stock catalog shipped with the app.
    pub fn builtin() -> Self {
        Self {
            packages: vec![
                CoinPackage::new("starter", 100, 0, 9.99),
                CoinPackage::new("popular", 250, 25, 19.99).popular(),
                CoinPackage::new("value", 500, 75, 39.99),
                CoinPackage::new("premium", 1000, 200, 74.99),
                CoinPackage::new("ultimate", 2500, 625, 179.99),
            ],
        }
    }

    pub fn list(&self) -> &[CoinPackage] {
        &self.packages
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn get(&self, id: &str) -> Result<&CoinPackage> {
        self.packages
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| MeterError::PackageNotFound { id: id.to_string() })
    }

    /// First package flagged as popular, if any.
    pub fn popular(&self) -> Option<&CoinPackage> {
        self.packages.iter().find(|p| p.is_popular)
    }

    /// Resolve `id` and credit it to `balance`. An unknown id fails before
    /// any credit is computed.
    pub fn purchase(&self, balance: f64, id: &str) -> Result<f64> {
        let package = self.get(id)?;
        let new_balance = purchase(balance, package);
        tracing::info!(
            package = %package.id,
            credited = package.total_credited(),
            new_balance,
            "coin package purchased"
        );
        Ok(new_balance)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_credited_includes_bonus() {
        let p = CoinPackage::new("p", 250, 25, 19.99);
        assert_eq!(p.total_credited(), 275);
    }

    #[test]
    fn test_purchase_credit() {
        let p = CoinPackage::new("p", 250, 25, 19.99);
        assert_eq!(purchase(100.0, &p), 375.0);
    }

    #[test]
    fn test_builtin_ids_unique_and_valid() {
        let builtin = Catalog::builtin();
        assert!(Catalog::new(builtin.list().to_vec()).is_ok());
        assert_eq!(builtin.len(), 5);
    }

    #[test]
    fn test_builtin_popular() {
        let popular = Catalog::builtin().popular().cloned().unwrap();
        assert_eq!(popular.id, "popular");
        assert_eq!(popular.coins, 250);
        assert_eq!(popular.bonus_coins, 25);
    }

    #[test]
    fn test_get_unknown() {
        let err = Catalog::builtin().get("does-not-exist").unwrap_err();
        assert!(matches!(err, MeterError::PackageNotFound { ref id } if id == "does-not-exist"));
    }

    #[test]
    fn test_rejects_bad_packages() {
        assert!(Catalog::new(vec![CoinPackage::new("", 1, 0, 1.0)]).is_err());
        assert!(Catalog::new(vec![CoinPackage::new("a", 0, 0, 1.0)]).is_err());
        assert!(Catalog::new(vec![CoinPackage::new("a", 1, 0, 0.0)]).is_err());
        assert!(Catalog::new(vec![CoinPackage::new("a", 1, 0, f64::NAN)]).is_err());
    }

    #[test]
    fn test_coins_per_usd_improves_with_size() {
        let c = Catalog::builtin();
        let starter = c.get("starter").unwrap().coins_per_usd();
        let ultimate = c.get("ultimate").unwrap().coins_per_usd();
        assert!(ultimate > starter);
    }
}
