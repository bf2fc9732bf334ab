//! Settlement contract, conduit and attribution settings.

use std::str::FromStr;

use alloy_primitives::{address, Address, B256, U256};
use serde::Deserialize;

use crate::application::PlannerSettings;
use crate::domain::DomainTag;
use crate::error::{ConfigError, Result};

/// Canonical settlement contract deployment (same address on every chain).
pub const DEFAULT_SETTLEMENT: Address = address!("0000000000000068F116a894984e2DB1123eB395");

/// A conduit the fulfiller may route token transfers through.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConduitConfig {
    pub key: B256,
    pub address: Address,
}

/// Exchange deployment settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeConfig {
    /// Settlement contract address.
    #[serde(default = "default_settlement")]
    pub settlement: Address,

    /// Registered conduits by key.
    #[serde(default)]
    pub conduits: Vec<ConduitConfig>,

    /// ERC-20 allowance granted by approvals: `"max"` or a decimal integer.
    #[serde(default = "default_max_allowance")]
    pub max_allowance: String,

    /// Domain whose tag is appended to settlement calldata.
    #[serde(default)]
    pub domain: Option<String>,

    /// Explicit four-byte tag in hex; wins over `domain`.
    #[serde(default)]
    pub domain_tag: Option<String>,
}

const fn default_settlement() -> Address {
    DEFAULT_SETTLEMENT
}

fn default_max_allowance() -> String {
    "max".to_string()
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            settlement: default_settlement(),
            conduits: Vec::new(),
            max_allowance: default_max_allowance(),
            domain: None,
            domain_tag: None,
        }
    }
}

impl ExchangeConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.settlement.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "settlement",
                reason: "must not be the zero address".to_string(),
            }
            .into());
        }
        if let Some(conduit) = self.conduits.iter().find(|c| c.key.is_zero()) {
            return Err(ConfigError::InvalidValue {
                field: "conduits",
                reason: format!(
                    "conduit {} uses the zero key reserved for the settlement contract",
                    conduit.address
                ),
            }
            .into());
        }
        self.max_allowance()?;
        self.domain_tag()?;
        Ok(())
    }

    /// Allowance written by ERC-20 approvals.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for anything other than `"max"`
    /// or a positive decimal integer.
    pub fn max_allowance(&self) -> Result<U256> {
        let raw = self.max_allowance.trim();
        if raw.eq_ignore_ascii_case("max") {
            return Ok(U256::MAX);
        }
        let value = U256::from_str_radix(raw, 10).map_err(|e| ConfigError::InvalidValue {
            field: "max_allowance",
            reason: e.to_string(),
        })?;
        if value.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "max_allowance",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        Ok(value)
    }

    /// Tag appended to settlement calldata, if configured.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if `domain_tag` is not four bytes
    /// of hex.
    pub fn domain_tag(&self) -> Result<Option<DomainTag>> {
        if let Some(raw) = &self.domain_tag {
            let tag = DomainTag::from_str(raw).map_err(|e| ConfigError::InvalidValue {
                field: "domain_tag",
                reason: e.to_string(),
            })?;
            return Ok(Some(tag));
        }
        Ok(self
            .domain
            .as_deref()
            .filter(|domain| !domain.trim().is_empty())
            .map(DomainTag::from_domain))
    }

    /// Planner settings for this deployment.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`max_allowance`](Self::max_allowance) and
    /// [`domain_tag`](Self::domain_tag).
    pub fn planner_settings(&self) -> Result<PlannerSettings> {
        let mut settings =
            PlannerSettings::new(self.settlement).with_max_allowance(self.max_allowance()?);
        for conduit in &self.conduits {
            settings = settings.with_conduit(conduit.key, conduit.address);
        }
        if let Some(tag) = self.domain_tag()? {
            settings = settings.with_domain_tag(tag);
        }
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_keyword_is_the_largest_allowance() {
        let config = ExchangeConfig::default();
        assert_eq!(config.max_allowance().unwrap(), U256::MAX);
    }

    #[test]
    fn explicit_allowance_is_parsed_as_decimal() {
        let config = ExchangeConfig {
            max_allowance: "1000000".to_string(),
            ..ExchangeConfig::default()
        };
        assert_eq!(config.max_allowance().unwrap(), U256::from(1_000_000));
    }

    #[test]
    fn zero_allowance_is_rejected() {
        let config = ExchangeConfig {
            max_allowance: "0".to_string(),
            ..ExchangeConfig::default()
        };
        assert!(config.max_allowance().is_err());
    }

    #[test]
    fn explicit_tag_wins_over_domain() {
        let config = ExchangeConfig {
            domain: Some("opensea.io".to_string()),
            domain_tag: Some("0xdeadbeef".to_string()),
            ..ExchangeConfig::default()
        };
        assert_eq!(
            config.domain_tag().unwrap(),
            Some(DomainTag::from_bytes([0xde, 0xad, 0xbe, 0xef]))
        );
    }

    #[test]
    fn domain_derives_tag() {
        let config = ExchangeConfig {
            domain: Some("opensea.io".to_string()),
            ..ExchangeConfig::default()
        };
        assert_eq!(
            config.domain_tag().unwrap(),
            Some(DomainTag::from_bytes([0x36, 0x0c, 0x6e, 0xbe]))
        );
    }
}
