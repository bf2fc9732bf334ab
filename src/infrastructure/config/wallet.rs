//! Signing key settings.

use serde::Deserialize;

/// Environment variable holding the hex-encoded signing key.
pub const PRIVATE_KEY_ENV: &str = "WALLET_PRIVATE_KEY";

/// Signing key holder. The key never comes from the config file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WalletConfig {
    #[serde(skip)]
    pub private_key: Option<String>,
}

impl WalletConfig {
    /// Read the key from [`PRIVATE_KEY_ENV`]; blank values count as unset.
    pub(crate) fn load_key(&mut self) {
        self.private_key = std::env::var(PRIVATE_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty());
    }
}
