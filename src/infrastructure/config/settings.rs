//! Top-level configuration file.
//!
//! A `config.toml` has four optional sections (`[network]`, `[exchange]`,
//! `[logging]`, `[wallet]`); anything left out takes its default. The signing
//! key is read from the environment, see [`WalletConfig`].
//!
//! ```no_run
//! use fillwright::infrastructure::config::settings::Config;
//!
//! # fn run() -> fillwright::error::Result<()> {
//! let config = Config::load("config.toml")?;
//! config.init_logging();
//! let settings = config.planner_settings()?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::Deserialize;

use super::exchange::ExchangeConfig;
use super::logging::LoggingConfig;
use super::network::NetworkConfig;
use super::wallet::{WalletConfig, PRIVATE_KEY_ENV};
use crate::application::PlannerSettings;
use crate::error::{ConfigError, Result};

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub exchange: ExchangeConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub wallet: WalletConfig,
}

impl Config {
    /// Read and validate a config file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::ReadFile`] when the file is unreadable, otherwise the
    /// errors of [`parse_toml`](Self::parse_toml).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&raw)
    }

    /// Parse and validate TOML text, then pick up the signing key.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] for malformed TOML, [`ConfigError::MissingField`]
    /// or [`ConfigError::InvalidValue`] when a section fails validation.
    pub fn parse_toml(raw: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(raw).map_err(ConfigError::Parse)?;
        config.network.validate()?;
        config.exchange.validate()?;
        config.wallet.load_key();
        Ok(config)
    }

    /// Planner settings for the configured deployment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for an unusable allowance or tag.
    pub fn planner_settings(&self) -> Result<PlannerSettings> {
        self.exchange.planner_settings()
    }

    /// Signing key, required for anything that submits transactions.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when the key variable is unset.
    pub fn private_key(&self) -> Result<&str> {
        self.wallet.private_key.as_deref().ok_or_else(|| {
            ConfigError::MissingField {
                field: PRIVATE_KEY_ENV,
            }
            .into()
        })
    }

    pub fn init_logging(&self) {
        self.logging.init();
    }
}
