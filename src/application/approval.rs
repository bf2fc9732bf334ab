//! Approval need resolution.
//!
//! Given the items a fulfiller has to pay and the operator that will move
//! them, decide which approvals are still missing. ERC-20 items are compared
//! against the queried allowance; collection items against the operator
//! approval flag. Native items never need approval.
//!
//! Requirements are grouped by `(token, operator)` before any query is made,
//! so several consideration items in the same token cost one query and yield
//! at most one approval.

use std::collections::HashMap;
use std::sync::Arc;

use alloy_primitives::{Address, U256};
use futures_util::future::join_all;
use tracing::debug;

use super::action::{ApprovalAction, ApprovalKind};
use crate::domain::{ConsiderationItem, DomainError, ItemType};
use crate::error::Result;
use crate::port::outbound::chain::ChainReader;
use crate::port::outbound::submit::TransactionSubmitter;

/// An item the fulfiller has to let `operator` transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalRequirement {
    pub token: Address,
    pub item_type: ItemType,
    pub identifier_or_criteria: U256,
    pub amount: U256,
    pub operator: Address,
}

impl ApprovalRequirement {
    /// Requirement for paying a resolved consideration item, if it needs one.
    ///
    /// Returns `None` for native items, which travel as call value.
    #[must_use]
    pub fn for_payment(item: &ConsiderationItem, operator: Address) -> Option<Self> {
        if item.item_type.is_native() {
            return None;
        }
        Some(Self {
            token: item.token,
            item_type: item.item_type,
            identifier_or_criteria: item.identifier_or_criteria,
            amount: item.amount(),
            operator,
        })
    }

    const fn key(&self) -> (Address, Address) {
        (self.token, self.operator)
    }
}

/// Collapse requirements sharing `(token, operator)`, keeping first-appearance
/// order. ERC-20 amounts are summed.
///
/// # Errors
///
/// Returns [`DomainError::AmountOverflow`] if summed ERC-20 amounts overflow.
pub fn group_requirements(
    requirements: &[ApprovalRequirement],
) -> std::result::Result<Vec<ApprovalRequirement>, DomainError> {
    let mut grouped: Vec<ApprovalRequirement> = Vec::with_capacity(requirements.len());
    let mut index: HashMap<(Address, Address), usize> = HashMap::new();

    for requirement in requirements {
        match index.get(&requirement.key()) {
            Some(&position) => {
                let existing = &mut grouped[position];
                if existing.item_type.is_erc20() {
                    existing.amount = existing.amount.checked_add(requirement.amount).ok_or(
                        DomainError::AmountOverflow {
                            context: "approval requirement",
                        },
                    )?;
                }
            }
            None => {
                index.insert(requirement.key(), grouped.len());
                grouped.push(requirement.clone());
            }
        }
    }

    Ok(grouped)
}

/// Decide which approvals `owner` still has to submit.
///
/// ERC-20 approvals are emitted with `max_allowance` rather than the exact
/// amount so later fulfillments against the same operator need no further
/// approval.
///
/// # Errors
///
/// Returns an error if a chain query fails or ERC-20 amounts overflow.
pub async fn resolve_approvals(
    requirements: &[ApprovalRequirement],
    owner: Address,
    reader: &dyn ChainReader,
    submitter: &Arc<dyn TransactionSubmitter>,
    max_allowance: U256,
) -> Result<Vec<ApprovalAction>> {
    let grouped = group_requirements(requirements)?;

    let checks = grouped
        .iter()
        .map(|requirement| needs_approval(requirement, owner, reader));
    let needed = join_all(checks).await;

    let mut approvals = Vec::new();
    for (requirement, needed) in grouped.into_iter().zip(needed) {
        if !needed? {
            debug!(
                token = %requirement.token,
                operator = %requirement.operator,
                "Approval already in place"
            );
            continue;
        }

        let kind = if requirement.item_type.is_erc20() {
            ApprovalKind::Allowance {
                amount: max_allowance,
            }
        } else {
            ApprovalKind::Operator
        };
        approvals.push(ApprovalAction::new(
            requirement.token,
            requirement.item_type,
            requirement.identifier_or_criteria,
            requirement.operator,
            kind,
            Arc::clone(submitter),
        ));
    }

    Ok(approvals)
}

async fn needs_approval(
    requirement: &ApprovalRequirement,
    owner: Address,
    reader: &dyn ChainReader,
) -> Result<bool> {
    match requirement.item_type {
        ItemType::Native => Ok(false),
        ItemType::Erc20 => {
            let allowance = reader
                .allowance(requirement.token, owner, requirement.operator)
                .await?;
            Ok(allowance < requirement.amount)
        }
        ItemType::Erc721
        | ItemType::Erc1155
        | ItemType::Erc721WithCriteria
        | ItemType::Erc1155WithCriteria => {
            let approved = reader
                .is_approved_for_all(requirement.token, owner, requirement.operator)
                .await?;
            Ok(!approved)
        }
    }
}
