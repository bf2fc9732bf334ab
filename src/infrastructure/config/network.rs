//! RPC endpoint configuration.

use serde::Deserialize;
use url::Url;

use crate::error::{ConfigError, Result};

/// Chain connection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    /// HTTP JSON-RPC endpoint.
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    /// Chain ID used when signing transactions.
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
}

fn default_rpc_url() -> String {
    "http://127.0.0.1:8545".to_string()
}

const fn default_chain_id() -> u64 {
    1
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            chain_id: default_chain_id(),
        }
    }
}

impl NetworkConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.rpc_url.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "rpc_url" }.into());
        }
        self.url()?;
        if self.chain_id == 0 {
            return Err(ConfigError::InvalidValue {
                field: "chain_id",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Parsed RPC endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if the URL does not parse.
    pub fn url(&self) -> Result<Url> {
        self.rpc_url
            .parse()
            .map_err(|e: url::ParseError| {
                ConfigError::InvalidValue {
                    field: "rpc_url",
                    reason: e.to_string(),
                }
                .into()
            })
    }
}
