//! Fulfillment orchestration.
//!
//! [`FulfillmentPlanner::plan`] validates a fill request against the order
//! and its on-chain status, resolves effective amounts, works out which
//! approvals are missing and returns the sequenced [`Plan`]. Nothing is
//! submitted while planning.

use std::collections::HashMap;
use std::sync::Arc;

use alloy_primitives::{Address, B256, U256};
use chrono::Utc;
use tracing::{debug, info};

use super::action::ExchangeAction;
use super::approval::{resolve_approvals, ApprovalRequirement};
use super::sequencer::{sequence, Plan};
use crate::domain::amount::mul_div;
use crate::domain::{
    compute_amount, fee_amount, ConsiderationItem, DomainError, DomainTag, ExchangeCall, Fee,
    FillFraction, FulfillmentStrategy, ItemType, OfferItem, Order, Progress, Rounding,
};
use crate::error::Result;
use crate::port::outbound::chain::ChainReader;
use crate::port::outbound::submit::TransactionSubmitter;

/// Exchange deployment the planner targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerSettings {
    /// Settlement contract; also the operator for the zero conduit key.
    pub settlement: Address,
    /// Registered conduits by key.
    pub conduits: HashMap<B256, Address>,
    /// Allowance granted by ERC-20 approvals.
    pub max_allowance: U256,
    /// Tag applied when a request does not carry its own.
    pub domain_tag: Option<DomainTag>,
}

impl PlannerSettings {
    #[must_use]
    pub fn new(settlement: Address) -> Self {
        Self {
            settlement,
            conduits: HashMap::new(),
            max_allowance: U256::MAX,
            domain_tag: None,
        }
    }

    #[must_use]
    pub fn with_conduit(mut self, key: B256, conduit: Address) -> Self {
        self.conduits.insert(key, conduit);
        self
    }

    #[must_use]
    pub const fn with_max_allowance(mut self, max_allowance: U256) -> Self {
        self.max_allowance = max_allowance;
        self
    }

    #[must_use]
    pub const fn with_domain_tag(mut self, tag: DomainTag) -> Self {
        self.domain_tag = Some(tag);
        self
    }

    /// Address allowed to move tokens for the given conduit key.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::UnknownConduit`] for an unregistered non-zero key.
    pub fn operator_for(&self, conduit_key: B256) -> std::result::Result<Address, DomainError> {
        if conduit_key.is_zero() {
            return Ok(self.settlement);
        }
        self.conduits
            .get(&conduit_key)
            .copied()
            .ok_or(DomainError::UnknownConduit { conduit_key })
    }
}

/// A request to fill (part of) an order.
#[derive(Debug, Clone)]
pub struct FulfillRequest {
    pub order: Order,
    /// Units of the first offer item to fill; the remaining units when `None`.
    pub units_to_fill: Option<U256>,
    /// Fulfilling account; must be the submitter's signer.
    pub account: Address,
    pub domain_tag: Option<DomainTag>,
    /// Receiver of the offer items; the account when `None`.
    pub recipient: Option<Address>,
    /// Fulfiller-supplied fees, paid in the order's currency.
    pub tips: Vec<Fee>,
    /// Conduit the fulfiller's tokens move through.
    pub conduit_key: B256,
    /// Evaluation time in unix seconds; the wall clock when `None`.
    pub timestamp: Option<u64>,
}

impl FulfillRequest {
    #[must_use]
    pub fn new(order: Order, account: Address) -> Self {
        Self {
            order,
            units_to_fill: None,
            account,
            domain_tag: None,
            recipient: None,
            tips: Vec::new(),
            conduit_key: B256::ZERO,
            timestamp: None,
        }
    }

    #[must_use]
    pub fn units(mut self, units: U256) -> Self {
        self.units_to_fill = Some(units);
        self
    }

    #[must_use]
    pub fn domain_tag(mut self, tag: DomainTag) -> Self {
        self.domain_tag = Some(tag);
        self
    }

    #[must_use]
    pub fn recipient(mut self, recipient: Address) -> Self {
        self.recipient = Some(recipient);
        self
    }

    #[must_use]
    pub fn tip(mut self, fee: Fee) -> Self {
        self.tips.push(fee);
        self
    }

    #[must_use]
    pub fn conduit_key(mut self, key: B256) -> Self {
        self.conduit_key = key;
        self
    }

    #[must_use]
    pub fn at(mut self, timestamp: u64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// Builds fulfillment plans against a chain snapshot.
pub struct FulfillmentPlanner {
    settings: PlannerSettings,
    reader: Arc<dyn ChainReader>,
    submitter: Arc<dyn TransactionSubmitter>,
}

impl FulfillmentPlanner {
    #[must_use]
    pub fn new(
        settings: PlannerSettings,
        reader: Arc<dyn ChainReader>,
        submitter: Arc<dyn TransactionSubmitter>,
    ) -> Self {
        Self {
            settings,
            reader,
            submitter,
        }
    }

    #[must_use]
    pub const fn settings(&self) -> &PlannerSettings {
        &self.settings
    }

    /// Submitter every planned action is sent through.
    #[must_use]
    pub fn submitter(&self) -> &Arc<dyn TransactionSubmitter> {
        &self.submitter
    }

    /// Validate the request and build its plan.
    ///
    /// # Errors
    ///
    /// Returns a [`DomainError`] when the request cannot be filled as asked,
    /// or a chain error if a status or allowance query fails.
    pub async fn plan(&self, request: FulfillRequest) -> Result<Plan> {
        let FulfillRequest {
            order,
            units_to_fill,
            account,
            domain_tag,
            recipient,
            tips,
            conduit_key,
            timestamp,
        } = request;

        let signer = self.submitter.account();
        if signer != account {
            return Err(DomainError::SignerMismatch {
                expected: account,
                actual: signer,
            }
            .into());
        }

        let total_units = order.total_units()?;
        if order.consideration.len() < order.total_original_consideration_items {
            return Err(DomainError::MissingOriginalConsiderationItems {
                expected: order.total_original_consideration_items,
                actual: order.consideration.len(),
            }
            .into());
        }

        let status = self.reader.order_status(order.hash).await?;
        debug!(
            order = %order.hash,
            cancelled = status.is_cancelled,
            total_filled = %status.total_filled,
            total_size = %status.total_size,
            "Fetched order status"
        );
        if status.is_cancelled {
            return Err(DomainError::OrderCancelled {
                order_hash: order.hash,
            }
            .into());
        }

        let now = timestamp.unwrap_or_else(unix_now);
        if !order.is_active_at(now) {
            return Err(DomainError::OrderNotActive {
                now,
                start_time: order.start_time,
                end_time: order.end_time,
            }
            .into());
        }

        let remaining = status.remaining_units(total_units)?;
        let units = units_to_fill.unwrap_or(remaining);
        if remaining.is_zero() {
            return Err(DomainError::InsufficientRemainingUnits {
                requested: units,
                remaining,
            }
            .into());
        }
        if units.is_zero() {
            return Err(DomainError::InvalidFraction {
                numerator: units,
                denominator: total_units,
            }
            .into());
        }
        if units > remaining {
            return Err(DomainError::InsufficientRemainingUnits {
                requested: units,
                remaining,
            }
            .into());
        }

        let fraction = FillFraction::new(units, total_units)?;
        if !fraction.is_full() && !order.order_type.allows_partial_fill() {
            return Err(DomainError::UnsupportedPartialFill {
                order_type: order.order_type,
            }
            .into());
        }
        // settlement rejects any fill that leaves a remainder on some item
        if !order.scales_exactly(&fraction.reduced()) {
            return Err(DomainError::InvalidFraction {
                numerator: units,
                denominator: total_units,
            }
            .into());
        }

        let progress = order.progress_at(now);
        let offer = effective_offer(&order.offer, progress, &fraction)?;
        let consideration = effective_consideration(&order.consideration, progress, &fraction)?;
        let tips = tip_items(&tips, &offer, &consideration, &fraction.reduced())?;

        let operator = self.settings.operator_for(conduit_key)?;
        let payments: Vec<&ConsiderationItem> = consideration.iter().chain(tips.iter()).collect();
        let value = native_value(&payments)?;
        let requirements: Vec<ApprovalRequirement> = payments
            .iter()
            .filter_map(|item| ApprovalRequirement::for_payment(item, operator))
            .collect();

        let approvals = resolve_approvals(
            &requirements,
            account,
            self.reader.as_ref(),
            &self.submitter,
            self.settings.max_allowance,
        )
        .await?;

        let custom_recipient = recipient.is_some_and(|r| r != account);
        let strategy = FulfillmentStrategy::select(&order, &fraction, custom_recipient);
        let call = ExchangeCall {
            settlement: self.settings.settlement,
            strategy,
            fraction: fraction.reduced(),
            offer,
            consideration,
            tips,
            fulfiller: account,
            recipient: recipient.unwrap_or(account),
            fulfiller_conduit_key: conduit_key,
            value,
            domain_tag: domain_tag.or(self.settings.domain_tag),
            order,
        };

        info!(
            order = %call.order.hash,
            fraction = %call.fraction,
            strategy = %strategy,
            approvals = approvals.len(),
            value = %value,
            "Fulfillment planned"
        );

        let exchange = ExchangeAction::new(call, Arc::clone(&self.submitter));
        Ok(sequence(approvals, exchange))
    }
}

fn unix_now() -> u64 {
    u64::try_from(Utc::now().timestamp()).unwrap_or_default()
}

fn effective_offer(
    items: &[OfferItem],
    progress: Progress,
    fraction: &FillFraction,
) -> std::result::Result<Vec<OfferItem>, DomainError> {
    items
        .iter()
        .map(|item| {
            let amount = compute_amount(
                item.start_amount,
                item.end_amount,
                progress,
                fraction,
                Rounding::Down,
            )?;
            Ok(item.with_amount(amount))
        })
        .collect()
}

fn effective_consideration(
    items: &[ConsiderationItem],
    progress: Progress,
    fraction: &FillFraction,
) -> std::result::Result<Vec<ConsiderationItem>, DomainError> {
    items
        .iter()
        .map(|item| {
            let amount = compute_amount(
                item.start_amount,
                item.end_amount,
                progress,
                fraction,
                Rounding::Up,
            )?;
            Ok(item.with_amount(amount))
        })
        .collect()
}

/// Turn fulfiller fees into consideration items in the payment currency.
///
/// When the order offers ERC-20 the fulfiller is accepting an offer and fees
/// come out of that token, based on the offered amount. Otherwise fees follow
/// the first currency item in the consideration, based on everything the
/// order asks in that currency.
///
/// Amounts round up to a multiple of the fill numerator so the settlement
/// contract can scale them back exactly.
fn tip_items(
    tips: &[Fee],
    offer: &[OfferItem],
    consideration: &[ConsiderationItem],
    fraction: &FillFraction,
) -> std::result::Result<Vec<ConsiderationItem>, DomainError> {
    if tips.is_empty() {
        return Ok(Vec::new());
    }

    let (item_type, token, base) = match offer.first() {
        Some(item) if item.item_type.is_erc20() => (item.item_type, item.token, item.start_amount),
        _ => {
            let currency = consideration
                .iter()
                .find(|item| item.item_type.is_currency())
                .ok_or(DomainError::TipsWithoutCurrency)?;
            let base = consideration
                .iter()
                .filter(|item| item.item_type == currency.item_type && item.token == currency.token)
                .try_fold(U256::ZERO, |sum, item| {
                    sum.checked_add(item.amount())
                        .ok_or(DomainError::AmountOverflow {
                            context: "tip base",
                        })
                })?;
            (currency.item_type, currency.token, base)
        }
    };

    let step = fraction.numerator();
    tips.iter()
        .map(|tip| {
            let fee = fee_amount(base, tip.basis_points, Rounding::Up)?;
            let amount = mul_div(fee, U256::from(1), step, Rounding::Up, "tip amount")?
                .checked_mul(step)
                .ok_or(DomainError::AmountOverflow {
                    context: "tip amount",
                })?;
            Ok(ConsiderationItem {
                item_type,
                token,
                identifier_or_criteria: U256::ZERO,
                start_amount: amount,
                end_amount: amount,
                recipient: tip.recipient,
            })
        })
        .collect()
}

fn native_value(payments: &[&ConsiderationItem]) -> std::result::Result<U256, DomainError> {
    payments
        .iter()
        .filter(|item| item.item_type == ItemType::Native)
        .try_fold(U256::ZERO, |sum, item| {
            sum.checked_add(item.amount())
                .ok_or(DomainError::AmountOverflow {
                    context: "native value",
                })
        })
}
