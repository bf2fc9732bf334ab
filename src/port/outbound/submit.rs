//! Transaction submission port.
//!
//! Every action of a plan delegates to a [`TransactionSubmitter`]. The
//! submitter signs as a single account and returns once the transaction is
//! confirmed, so a returned [`TxReceipt`] means the state change has landed.

use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;

use crate::domain::ExchangeCall;
use crate::error::Result;

/// Confirmation of a submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxReceipt {
    /// Transaction hash for tracking.
    pub tx_hash: B256,
}

/// Port for sending approval and settlement transactions.
///
/// # Thread Safety
///
/// Implementations must be thread-safe (`Send + Sync`).
///
/// # Errors
///
/// Methods return [`Result`] when the transaction cannot be sent, is not
/// confirmed, or reverts.
#[async_trait]
pub trait TransactionSubmitter: Send + Sync {
    /// Account every transaction is signed by.
    fn account(&self) -> Address;

    /// Set the ERC-20 allowance of `operator` over `token` to `amount`.
    async fn approve(&self, token: Address, operator: Address, amount: U256) -> Result<TxReceipt>;

    /// Approve `operator` for every token of the `token` collection.
    async fn set_approval_for_all(&self, token: Address, operator: Address) -> Result<TxReceipt>;

    /// Send the settlement call.
    async fn fulfill(&self, call: &ExchangeCall) -> Result<TxReceipt>;
}
