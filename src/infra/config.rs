// src/infra/config.rs — Configuration loading (TOML)

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::core::catalog::{Catalog, CoinPackage};
use crate::core::meter::MeterPolicy;
use crate::infra::errors::MeterError;
use crate::infra::paths;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub billing: BillingConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Replaces the built-in catalog when non-empty.
    #[serde(default)]
    pub packages: Vec<CoinPackage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingConfig {
    /// A session ends on the tick where the projected remaining balance
    /// is at or below this value.
    pub termination_floor: f64,
    /// Low-balance warning threshold, in minutes of talk time.
    pub low_balance_minutes: f64,
    /// Wall-clock period between ticks. Each tick bills one second.
    pub tick_interval_ms: u64,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            termination_floor: 0.0,
            low_balance_minutes: 2.0,
            tick_interval_ms: 1000,
        }
    }
}

impl BillingConfig {
    pub fn policy(&self) -> MeterPolicy {
        MeterPolicy {
            termination_floor: self.termination_floor,
            low_balance_minutes: self.low_balance_minutes,
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".into(),
        }
    }
}

impl Config {
    /// Load config from file, falling back to defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = paths::config_file_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the meter cannot run with.
    pub fn validate(&self) -> Result<(), MeterError> {
        let b = &self.billing;
        if !b.termination_floor.is_finite() || b.termination_floor < 0.0 {
            return Err(MeterError::Config(format!(
                "billing.termination_floor must be >= 0, got {}",
                b.termination_floor
            )));
        }
        if !b.low_balance_minutes.is_finite() || b.low_balance_minutes < 0.0 {
            return Err(MeterError::Config(format!(
                "billing.low_balance_minutes must be >= 0, got {}",
                b.low_balance_minutes
            )));
        }
        if b.tick_interval_ms == 0 {
            return Err(MeterError::Config(
                "billing.tick_interval_ms must be positive".into(),
            ));
        }
        self.catalog().map(|_| ())
    }

    /// The configured catalog, or the built-in one when none is configured.
    pub fn catalog(&self) -> Result<Catalog, MeterError> {
        if self.packages.is_empty() {
            Ok(Catalog::builtin())
        } else {
            Catalog::new(self.packages.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_preserve_thresholds() {
        let c = Config::default();
        assert_eq!(c.billing.termination_floor, 0.0);
        assert!((c.billing.low_balance_minutes - 2.0).abs() < f64::EPSILON);
        assert_eq!(c.billing.tick_interval(), Duration::from_secs(1));
        assert_eq!(c.logging.level, "warn");
        assert!(c.packages.is_empty());
    }

    #[test]
    fn test_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.billing.tick_interval_ms, 1000);
        assert!(config.validate().is_ok());
        assert_eq!(config.catalog().unwrap().len(), Catalog::builtin().len());
    }

    #[test]
    fn test_parse_full_toml() {
        let toml_str = r#"
[billing]
termination_floor = 0.5
low_balance_minutes = 3.0
tick_interval_ms = 250

[logging]
level = "debug"

[[packages]]
id = "tiny"
coins = 10
bonus_coins = 0
price_usd = 0.99
is_popular = false

[[packages]]
id = "big"
coins = 1000
bonus_coins = 100
price_usd = 49.99
is_popular = true
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert!((config.billing.termination_floor - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.billing.tick_interval(), Duration::from_millis(250));
        assert_eq!(config.logging.level, "debug");
        assert!(config.validate().is_ok());

        let catalog = config.catalog().unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("big").unwrap().total_credited(), 1100);
    }

    #[test]
    fn test_duplicate_package_ids_rejected() {
        let toml_str = r#"
[[packages]]
id = "dup"
coins = 10
price_usd = 1.0

[[packages]]
id = "dup"
coins = 20
price_usd = 2.0
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert!(matches!(config.validate(), Err(MeterError::Config(_))));
    }

    #[test]
    fn test_zero_tick_interval_rejected() {
        let toml_str = r#"
[billing]
termination_floor = 0.0
low_balance_minutes = 2.0
tick_interval_ms = 0
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert!(matches!(config.validate(), Err(MeterError::Config(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[logging]\nlevel = \"info\"\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_from_invalid_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let toml_str = r#"
[billing]
termination_floor = -1.0
low_balance_minutes = 2.0
tick_interval_ms = 1000
"#;
        std::fs::write(&path, toml_str).unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
