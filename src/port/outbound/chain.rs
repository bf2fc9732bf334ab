//! Chain state port for order status and approval queries.
//!
//! Each method is a logically independent read. Implementations are free to
//! batch them (multicall) or serve them from a snapshot; the planner issues
//! them concurrently and never assumes an ordering between them.

use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;

use crate::domain::OrderStatus;
use crate::error::Result;

/// Read access to the chain state a fulfillment plan depends on.
///
/// # Thread Safety
///
/// Implementations must be thread-safe (`Send + Sync`).
///
/// # Errors
///
/// Methods return [`Result`] for RPC or decoding failures.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Fill accounting of an order as stored by the settlement contract.
    ///
    /// Unknown orders report the default (unfilled, not cancelled) status.
    async fn order_status(&self, order_hash: B256) -> Result<OrderStatus>;

    /// ERC-20 allowance `owner` has granted to `operator`.
    async fn allowance(&self, token: Address, owner: Address, operator: Address) -> Result<U256>;

    /// Whether `operator` may move every token of the collection held by `owner`.
    async fn is_approved_for_all(
        &self,
        token: Address,
        owner: Address,
        operator: Address,
    ) -> Result<bool>;
}
