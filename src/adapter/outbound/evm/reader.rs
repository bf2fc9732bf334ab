//! Chain state reads over JSON-RPC.

use alloy_primitives::{Address, B256, U256};
use alloy_provider::ProviderBuilder;
use async_trait::async_trait;
use tracing::debug;
use url::Url;

use super::contracts::{ICollection, IERC20, ISettlement};
use crate::domain::OrderStatus;
use crate::error::{ChainError, Result};
use crate::port::outbound::chain::ChainReader;

/// [`ChainReader`] backed by an HTTP RPC endpoint.
#[derive(Debug, Clone)]
pub struct EvmChainReader {
    rpc_url: Url,
    settlement: Address,
}

impl EvmChainReader {
    #[must_use]
    pub const fn new(rpc_url: Url, settlement: Address) -> Self {
        Self {
            rpc_url,
            settlement,
        }
    }
}

#[async_trait]
impl ChainReader for EvmChainReader {
    async fn order_status(&self, order_hash: B256) -> Result<OrderStatus> {
        let provider = ProviderBuilder::new().connect_http(self.rpc_url.clone());
        let settlement = ISettlement::new(self.settlement, &provider);

        let status = settlement
            .getOrderStatus(order_hash)
            .call()
            .await
            .map_err(|e| ChainError::Query(format!("Failed to get order status: {e}")))?;

        debug!(order = %order_hash, total_filled = %status.totalFilled, "Order status fetched");

        Ok(OrderStatus {
            is_validated: status.isValidated,
            is_cancelled: status.isCancelled,
            total_filled: status.totalFilled,
            total_size: status.totalSize,
        })
    }

    async fn allowance(&self, token: Address, owner: Address, operator: Address) -> Result<U256> {
        let provider = ProviderBuilder::new().connect_http(self.rpc_url.clone());
        let erc20 = IERC20::new(token, &provider);

        let allowance: U256 = erc20
            .allowance(owner, operator)
            .call()
            .await
            .map_err(|e| ChainError::Query(format!("Failed to get allowance: {e}")))?;

        Ok(allowance)
    }

    async fn is_approved_for_all(
        &self,
        token: Address,
        owner: Address,
        operator: Address,
    ) -> Result<bool> {
        let provider = ProviderBuilder::new().connect_http(self.rpc_url.clone());
        let collection = ICollection::new(token, &provider);

        let approved: bool = collection
            .isApprovedForAll(owner, operator)
            .call()
            .await
            .map_err(|e| ChainError::Query(format!("Failed to get operator approval: {e}")))?;

        Ok(approved)
    }
}
