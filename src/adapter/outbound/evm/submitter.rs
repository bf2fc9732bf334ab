//! Signed transaction submission over JSON-RPC.

use std::str::FromStr;
use std::sync::Arc;

use alloy_primitives::{Address, U256};
use alloy_provider::network::{
    Ethereum, EthereumWallet, Network, ReceiptResponse, TransactionBuilder,
};
use alloy_provider::{Provider, ProviderBuilder};
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use tracing::info;
use url::Url;

use super::contracts::{ICollection, IERC20};
use crate::domain::ExchangeCall;
use crate::error::{ChainError, ConfigError, Result};
use crate::port::outbound::encode::CalldataEncoder;
use crate::port::outbound::submit::{TransactionSubmitter, TxReceipt};

/// [`TransactionSubmitter`] signing with a local private key.
///
/// Each method waits for the receipt and fails on a reverted status.
pub struct EvmSubmitter {
    /// Local signer derived from the wallet private key.
    signer: PrivateKeySigner,
    rpc_url: Url,
    encoder: Arc<dyn CalldataEncoder>,
}

impl EvmSubmitter {
    /// Create a submitter from a hex private key.
    ///
    /// # Errors
    ///
    /// Returns an error if the private key is missing or invalid.
    pub fn new(
        private_key: &str,
        chain_id: u64,
        rpc_url: Url,
        encoder: Arc<dyn CalldataEncoder>,
    ) -> Result<Self> {
        if private_key.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "WALLET_PRIVATE_KEY",
            }
            .into());
        }

        let signer = PrivateKeySigner::from_str(private_key.trim())
            .map_err(|e| ConfigError::InvalidValue {
                field: "WALLET_PRIVATE_KEY",
                reason: e.to_string(),
            })?
            .with_chain_id(Some(chain_id));

        Ok(Self {
            signer,
            rpc_url,
            encoder,
        })
    }

    fn checked(receipt: &impl ReceiptResponse) -> Result<TxReceipt> {
        let tx_hash = receipt.transaction_hash();
        if !receipt.status() {
            return Err(ChainError::Reverted { tx_hash }.into());
        }
        Ok(TxReceipt { tx_hash })
    }
}

#[async_trait]
impl TransactionSubmitter for EvmSubmitter {
    fn account(&self) -> Address {
        self.signer.address()
    }

    async fn approve(&self, token: Address, operator: Address, amount: U256) -> Result<TxReceipt> {
        let wallet = EthereumWallet::from(self.signer.clone());
        let provider = ProviderBuilder::new()
            .wallet(wallet)
            .connect_http(self.rpc_url.clone());

        let erc20 = IERC20::new(token, &provider);
        let pending_tx = erc20
            .approve(operator, amount)
            .send()
            .await
            .map_err(|e| ChainError::Transaction(format!("Failed to send approval: {e}")))?;

        let receipt = pending_tx
            .get_receipt()
            .await
            .map_err(|e| ChainError::Transaction(format!("Failed to get receipt: {e}")))?;

        let confirmed = Self::checked(&receipt)?;
        info!(tx_hash = %confirmed.tx_hash, token = %token, "Approval transaction confirmed");
        Ok(confirmed)
    }

    async fn set_approval_for_all(&self, token: Address, operator: Address) -> Result<TxReceipt> {
        let wallet = EthereumWallet::from(self.signer.clone());
        let provider = ProviderBuilder::new()
            .wallet(wallet)
            .connect_http(self.rpc_url.clone());

        let collection = ICollection::new(token, &provider);
        let pending_tx = collection
            .setApprovalForAll(operator, true)
            .send()
            .await
            .map_err(|e| {
                ChainError::Transaction(format!("Failed to send operator approval: {e}"))
            })?;

        let receipt = pending_tx
            .get_receipt()
            .await
            .map_err(|e| ChainError::Transaction(format!("Failed to get receipt: {e}")))?;

        let confirmed = Self::checked(&receipt)?;
        info!(tx_hash = %confirmed.tx_hash, token = %token, "Operator approval confirmed");
        Ok(confirmed)
    }

    async fn fulfill(&self, call: &ExchangeCall) -> Result<TxReceipt> {
        let calldata = call.tag_calldata(self.encoder.encode(call)?);

        let wallet = EthereumWallet::from(self.signer.clone());
        let provider = ProviderBuilder::new()
            .wallet(wallet)
            .connect_http(self.rpc_url.clone());

        let tx = <Ethereum as Network>::TransactionRequest::default()
            .with_to(call.settlement)
            .with_input(calldata)
            .with_value(call.value);

        let pending_tx = provider
            .send_transaction(tx)
            .await
            .map_err(|e| ChainError::Transaction(format!("Failed to send fulfillment: {e}")))?;

        let receipt = pending_tx
            .get_receipt()
            .await
            .map_err(|e| ChainError::Transaction(format!("Failed to get receipt: {e}")))?;

        let confirmed = Self::checked(&receipt)?;
        info!(
            tx_hash = %confirmed.tx_hash,
            order = %call.order.hash,
            "Fulfillment confirmed"
        );
        Ok(confirmed)
    }
}
