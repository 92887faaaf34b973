//! Server configuration
//!
//! Loaded from `LEDGER_`-prefixed environment variables over defaults.
//! Nested keys use a double underscore, e.g.
//! `LEDGER_BILLING__GRACE_DAYS=14`.

use serde::Deserialize;

use core_kernel::Currency;
use domain_billing::BillingConfig;

/// Where ledger and billing data live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Postgres,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Default filter when `RUST_LOG` is unset
    pub log_level: String,
    pub log_format: LogFormat,
    pub storage: StorageBackend,
    /// Required when `storage` is `postgres`
    pub database_url: String,
    /// Ledger currency
    pub currency: Currency,
    pub billing: BillingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            storage: StorageBackend::Memory,
            database_url: "postgres://localhost/estate_ledger".to_string(),
            currency: Currency::USD,
            billing: BillingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from the environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::with_prefix("LEDGER")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server_addr(), "0.0.0.0:8080");
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.billing.receivable_account, "1100");
    }

    #[test]
    fn test_nested_billing_keys() {
        let config: AppConfig = config::Config::builder()
            .set_override("storage", "postgres")
            .unwrap()
            .set_override("billing.grace_days", 14)
            .unwrap()
            .set_override("currency", "EUR")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.storage, StorageBackend::Postgres);
        assert_eq!(config.billing.grace_days, 14);
        assert_eq!(config.billing.fund_account, "2100");
        assert_eq!(config.currency, Currency::EUR);
        assert_eq!(config.port, 8080);
    }
}
