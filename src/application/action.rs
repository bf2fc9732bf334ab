//! Plan actions.
//!
//! An [`Action`] is either a token approval or the single exchange call. Both
//! carry the submitter that will send them, so a caller holding a plan can
//! submit any step without further wiring.

use std::fmt;
use std::sync::Arc;

use alloy_primitives::{Address, U256};
use tracing::info;

use crate::domain::{ExchangeCall, ItemType};
use crate::error::{ExecutionError, Result};
use crate::port::outbound::submit::{TransactionSubmitter, TxReceipt};

/// What an approval grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalKind {
    /// ERC-20 allowance set to `amount`.
    Allowance { amount: U256 },
    /// Collection-wide operator approval (ERC-721/1155).
    Operator,
}

/// Grant `operator` permission to move `token` on the fulfiller's behalf.
#[derive(Clone)]
pub struct ApprovalAction {
    token: Address,
    item_type: ItemType,
    identifier_or_criteria: U256,
    operator: Address,
    kind: ApprovalKind,
    submitter: Arc<dyn TransactionSubmitter>,
}

impl ApprovalAction {
    pub(crate) fn new(
        token: Address,
        item_type: ItemType,
        identifier_or_criteria: U256,
        operator: Address,
        kind: ApprovalKind,
        submitter: Arc<dyn TransactionSubmitter>,
    ) -> Self {
        Self {
            token,
            item_type,
            identifier_or_criteria,
            operator,
            kind,
            submitter,
        }
    }

    #[must_use]
    pub const fn token(&self) -> Address {
        self.token
    }

    #[must_use]
    pub const fn item_type(&self) -> ItemType {
        self.item_type
    }

    #[must_use]
    pub const fn identifier_or_criteria(&self) -> U256 {
        self.identifier_or_criteria
    }

    #[must_use]
    pub const fn operator(&self) -> Address {
        self.operator
    }

    #[must_use]
    pub const fn kind(&self) -> ApprovalKind {
        self.kind
    }

    /// Deduplication key: one approval per token and operator.
    #[must_use]
    pub const fn key(&self) -> (Address, Address) {
        (self.token, self.operator)
    }

    /// Send the approval and wait for confirmation.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError::ApprovalSubmissionFailed`] wrapping the
    /// submitter's error.
    pub async fn submit(&self) -> Result<TxReceipt> {
        info!(
            token = %self.token,
            operator = %self.operator,
            item_type = %self.item_type,
            "Submitting approval"
        );

        let result = match self.kind {
            ApprovalKind::Allowance { amount } => {
                self.submitter.approve(self.token, self.operator, amount).await
            }
            ApprovalKind::Operator => {
                self.submitter
                    .set_approval_for_all(self.token, self.operator)
                    .await
            }
        };

        result.map_err(|e| {
            ExecutionError::ApprovalSubmissionFailed {
                token: self.token,
                operator: self.operator,
                source: Box::new(e),
            }
            .into()
        })
    }
}

impl fmt::Debug for ApprovalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApprovalAction")
            .field("token", &self.token)
            .field("item_type", &self.item_type)
            .field("identifier_or_criteria", &self.identifier_or_criteria)
            .field("operator", &self.operator)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// The settlement call that executes the trade.
#[derive(Clone)]
pub struct ExchangeAction {
    call: ExchangeCall,
    submitter: Arc<dyn TransactionSubmitter>,
}

impl ExchangeAction {
    pub(crate) fn new(call: ExchangeCall, submitter: Arc<dyn TransactionSubmitter>) -> Self {
        Self { call, submitter }
    }

    #[must_use]
    pub const fn call(&self) -> &ExchangeCall {
        &self.call
    }

    /// Send the settlement call and wait for confirmation.
    ///
    /// Submitting before a still-required approval has landed is expected to
    /// fail here, at the settlement boundary.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError::ExchangeSubmissionFailed`] wrapping the
    /// submitter's error.
    pub async fn submit(&self) -> Result<TxReceipt> {
        info!(
            order = %self.call.order.hash,
            strategy = %self.call.strategy,
            fraction = %self.call.fraction,
            value = %self.call.value,
            "Submitting exchange call"
        );

        self.submitter.fulfill(&self.call).await.map_err(|e| {
            ExecutionError::ExchangeSubmissionFailed {
                source: Box::new(e),
            }
            .into()
        })
    }
}

impl fmt::Debug for ExchangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExchangeAction")
            .field("call", &self.call)
            .finish_non_exhaustive()
    }
}

/// One step of a plan.
#[derive(Debug, Clone)]
pub enum Action {
    Approval(ApprovalAction),
    Exchange(ExchangeAction),
}

impl Action {
    /// Submit this step and wait for confirmation.
    ///
    /// # Errors
    ///
    /// See [`ApprovalAction::submit`] and [`ExchangeAction::submit`].
    pub async fn submit(&self) -> Result<TxReceipt> {
        match self {
            Self::Approval(approval) => approval.submit().await,
            Self::Exchange(exchange) => exchange.submit().await,
        }
    }

    #[must_use]
    pub const fn as_approval(&self) -> Option<&ApprovalAction> {
        match self {
            Self::Approval(approval) => Some(approval),
            Self::Exchange(_) => None,
        }
    }

    #[must_use]
    pub const fn as_exchange(&self) -> Option<&ExchangeAction> {
        match self {
            Self::Approval(_) => None,
            Self::Exchange(exchange) => Some(exchange),
        }
    }

    #[must_use]
    pub const fn is_exchange(&self) -> bool {
        matches!(self, Self::Exchange(_))
    }

    /// Short label for logs and tables.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Approval(ApprovalAction {
                kind: ApprovalKind::Allowance { .. },
                ..
            }) => "approve",
            Self::Approval(_) => "setApprovalForAll",
            Self::Exchange(_) => "fulfill",
        }
    }
}
