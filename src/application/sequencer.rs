//! Action sequencing and plan execution.

use std::collections::HashSet;

use alloy_primitives::Address;
use tracing::{debug, info};

use super::action::{Action, ApprovalAction, ExchangeAction};
use crate::domain::FulfillmentStrategy;
use crate::error::Result;
use crate::port::outbound::submit::TxReceipt;

/// Ordered actions that fulfill one order.
///
/// Approvals come first, each `(token, operator)` at most once, and the
/// exchange action is always last. A plan reflects the chain state it was
/// built from; if that state moves on, the settlement contract rejects the
/// exchange call.
#[derive(Debug, Clone)]
pub struct Plan {
    approvals: Vec<ApprovalAction>,
    exchange: ExchangeAction,
    strategy: FulfillmentStrategy,
}

impl Plan {
    /// Every action in submission order, exchange last.
    ///
    /// The actions share the plan's submitter, so any of them can be
    /// submitted on its own.
    #[must_use]
    pub fn actions(&self) -> Vec<Action> {
        self.approvals
            .iter()
            .cloned()
            .map(Action::Approval)
            .chain(std::iter::once(Action::Exchange(self.exchange.clone())))
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.approvals.len() + 1
    }

    /// Always false: a plan holds at least its exchange action.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    pub fn approvals(&self) -> impl Iterator<Item = &ApprovalAction> {
        self.approvals.iter()
    }

    #[must_use]
    pub const fn exchange(&self) -> &ExchangeAction {
        &self.exchange
    }

    #[must_use]
    pub const fn strategy(&self) -> FulfillmentStrategy {
        self.strategy
    }

    /// Submit every action in order, waiting for each confirmation.
    ///
    /// Stops at the first failure. Approvals confirmed before the failure
    /// stay in place.
    ///
    /// # Errors
    ///
    /// Returns the failing action's [`ExecutionError`](crate::error::ExecutionError).
    pub async fn execute_all(&self) -> Result<TxReceipt> {
        let total = self.len();

        for (step, approval) in self.approvals.iter().enumerate() {
            let receipt = approval.submit().await?;
            info!(
                step = step + 1,
                total,
                token = %approval.token(),
                tx_hash = %receipt.tx_hash,
                "Approval confirmed"
            );
        }

        let receipt = self.exchange.submit().await?;
        info!(step = total, total, tx_hash = %receipt.tx_hash, "Exchange confirmed");
        Ok(receipt)
    }
}

/// Order approvals before the exchange call and drop repeated approvals.
///
/// The first approval for a `(token, operator)` pair is kept; relative order
/// of the survivors is preserved.
#[must_use]
pub fn sequence(approvals: Vec<ApprovalAction>, exchange: ExchangeAction) -> Plan {
    let strategy = exchange.call().strategy;
    let mut seen: HashSet<(Address, Address)> = HashSet::with_capacity(approvals.len());

    let approvals = approvals
        .into_iter()
        .filter(|approval| {
            let fresh = seen.insert(approval.key());
            if !fresh {
                debug!(
                    token = %approval.token(),
                    operator = %approval.operator(),
                    "Dropping duplicate approval"
                );
            }
            fresh
        })
        .collect();

    Plan {
        approvals,
        exchange,
        strategy,
    }
}
