//! Signed orders and their on-chain fill status.

use std::fmt;

use alloy_primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

use super::amount::{mul_div, Progress, Rounding};
use super::error::DomainError;
use super::fraction::FillFraction;
use super::item::{ConsiderationItem, OfferItem};

/// Fill and zone restrictions of an order.
///
/// Serialized as the settlement contract's numeric order type (`0..=4`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum OrderType {
    FullOpen,
    PartialOpen,
    FullRestricted,
    PartialRestricted,
    Contract,
}

impl OrderType {
    /// True when the order may be filled in fractions.
    #[must_use]
    pub const fn allows_partial_fill(self) -> bool {
        matches!(self, Self::PartialOpen | Self::PartialRestricted)
    }

    #[must_use]
    pub const fn is_contract(self) -> bool {
        matches!(self, Self::Contract)
    }
}

impl TryFrom<u8> for OrderType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::FullOpen),
            1 => Ok(Self::PartialOpen),
            2 => Ok(Self::FullRestricted),
            3 => Ok(Self::PartialRestricted),
            4 => Ok(Self::Contract),
            other => Err(format!("unknown order type {other}")),
        }
    }
}

impl From<OrderType> for u8 {
    fn from(value: OrderType) -> Self {
        match value {
            OrderType::FullOpen => 0,
            OrderType::PartialOpen => 1,
            OrderType::FullRestricted => 2,
            OrderType::PartialRestricted => 3,
            OrderType::Contract => 4,
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FullOpen => "FULL_OPEN",
            Self::PartialOpen => "PARTIAL_OPEN",
            Self::FullRestricted => "FULL_RESTRICTED",
            Self::PartialRestricted => "PARTIAL_RESTRICTED",
            Self::Contract => "CONTRACT",
        };
        f.write_str(name)
    }
}

/// A signed order, read-only to the planner.
///
/// `hash` is computed by whoever constructed and signed the order; the
/// planner only uses it as the key for order status queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub offerer: Address,
    pub zone: Address,
    pub offer: Vec<OfferItem>,
    pub consideration: Vec<ConsiderationItem>,
    pub order_type: OrderType,
    pub start_time: u64,
    pub end_time: u64,
    #[serde(default)]
    pub zone_hash: B256,
    pub salt: U256,
    #[serde(default)]
    pub conduit_key: B256,
    pub counter: U256,
    pub total_original_consideration_items: usize,
    #[serde(default)]
    pub signature: Bytes,
    pub hash: B256,
}

impl Order {
    /// Units the order is sold in: the first offer item's amount.
    ///
    /// A fill of `n` units is the fraction `n / total_units` of every item.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::EmptyOffer`] for orders without offer items.
    pub fn total_units(&self) -> Result<U256, DomainError> {
        self.offer
            .first()
            .map(|item| item.start_amount)
            .ok_or(DomainError::EmptyOffer)
    }

    /// True when `fraction` scales every start and end amount to an integer.
    #[must_use]
    pub fn scales_exactly(&self, fraction: &FillFraction) -> bool {
        let offer = self
            .offer
            .iter()
            .flat_map(|item| [item.start_amount, item.end_amount]);
        let consideration = self
            .consideration
            .iter()
            .flat_map(|item| [item.start_amount, item.end_amount]);
        offer
            .chain(consideration)
            .all(|amount| fraction.scales_exactly(amount))
    }

    /// True when `now` falls inside `[start_time, end_time)`.
    #[must_use]
    pub fn is_active_at(&self, now: u64) -> bool {
        self.start_time <= now && now < self.end_time
    }

    /// Position of `now` inside the order's active window.
    #[must_use]
    pub fn progress_at(&self, now: u64) -> Progress {
        let duration = self.end_time.saturating_sub(self.start_time);
        Progress::new(now.saturating_sub(self.start_time), duration)
    }

    /// True when any item is selected by criteria.
    #[must_use]
    pub fn has_criteria_items(&self) -> bool {
        self.offer.iter().any(|item| item.item_type.has_criteria())
            || self
                .consideration
                .iter()
                .any(|item| item.item_type.has_criteria())
    }

    /// True when every item has static amounts.
    #[must_use]
    pub fn has_static_amounts(&self) -> bool {
        self.offer.iter().all(OfferItem::is_static)
            && self.consideration.iter().all(ConsiderationItem::is_static)
    }
}

/// Fill accounting as reported by the settlement contract.
///
/// `total_filled / total_size` is the filled share of the order; a zero
/// `total_size` means nothing has been filled yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderStatus {
    pub is_validated: bool,
    pub is_cancelled: bool,
    pub total_filled: U256,
    pub total_size: U256,
}

impl OrderStatus {
    /// Units still fillable out of `total_units`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::AmountOverflow`] if scaling overflows.
    pub fn remaining_units(&self, total_units: U256) -> Result<U256, DomainError> {
        if self.total_size.is_zero() {
            return Ok(total_units);
        }
        let unfilled = self.total_size.saturating_sub(self.total_filled);
        mul_div(
            total_units,
            unfilled,
            self.total_size,
            Rounding::Down,
            "remaining units",
        )
    }

    /// True once the whole order has been filled.
    #[must_use]
    pub fn is_fully_filled(&self) -> bool {
        !self.total_size.is_zero() && self.total_filled >= self.total_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::item::ItemType;

    fn order(offer_amount: u64) -> Order {
        Order {
            offerer: Address::with_last_byte(1),
            zone: Address::ZERO,
            offer: vec![OfferItem {
                item_type: ItemType::Erc1155,
                token: Address::with_last_byte(2),
                identifier_or_criteria: U256::from(1),
                start_amount: U256::from(offer_amount),
                end_amount: U256::from(offer_amount),
            }],
            consideration: vec![],
            order_type: OrderType::PartialOpen,
            start_time: 100,
            end_time: 200,
            zone_hash: B256::ZERO,
            salt: U256::ZERO,
            conduit_key: B256::ZERO,
            counter: U256::ZERO,
            total_original_consideration_items: 0,
            signature: Bytes::new(),
            hash: B256::with_last_byte(9),
        }
    }

    #[test]
    fn only_partial_types_allow_partial_fills() {
        assert!(OrderType::PartialOpen.allows_partial_fill());
        assert!(OrderType::PartialRestricted.allows_partial_fill());
        assert!(!OrderType::FullOpen.allows_partial_fill());
        assert!(!OrderType::FullRestricted.allows_partial_fill());
        assert!(!OrderType::Contract.allows_partial_fill());
    }

    #[test]
    fn order_type_displays_protocol_name() {
        assert_eq!(OrderType::PartialRestricted.to_string(), "PARTIAL_RESTRICTED");
    }

    fn with_payment(mut order: Order, amounts: &[u64]) -> Order {
        for &amount in amounts {
            order.consideration.push(ConsiderationItem {
                item_type: ItemType::Erc20,
                token: Address::with_last_byte(4),
                identifier_or_criteria: U256::ZERO,
                start_amount: U256::from(amount),
                end_amount: U256::from(amount),
                recipient: Address::with_last_byte(1),
            });
        }
        order
    }

    #[test]
    fn total_units_are_the_first_offer_amount() {
        assert_eq!(order(10).total_units().unwrap(), U256::from(10));

        // 3 items for 5.17 USDC at 2.43%: the payment split shares no factor of 3
        let order = with_payment(order(3), &[5_044_369, 125_631]);
        assert_eq!(order.total_units().unwrap(), U256::from(3));
    }

    #[test]
    fn fractions_must_scale_every_amount_exactly() {
        let third = |n: u64| FillFraction::new(U256::from(n), U256::from(3)).unwrap();

        let divisible = with_payment(order(3), &[15_133_107, 376_893]);
        assert!(divisible.scales_exactly(&third(1)));
        assert!(divisible.scales_exactly(&third(2)));

        let indivisible = with_payment(order(3), &[5_044_369, 125_631]);
        assert!(!indivisible.scales_exactly(&third(1)));
        assert!(!indivisible.scales_exactly(&third(2)));
        assert!(indivisible.scales_exactly(&third(3)));
    }

    #[test]
    fn empty_offer_has_no_units() {
        let mut order = order(10);
        order.offer.clear();
        assert_eq!(order.total_units(), Err(DomainError::EmptyOffer));
    }

    #[test]
    fn active_window_is_half_open() {
        let order = order(1);
        assert!(!order.is_active_at(99));
        assert!(order.is_active_at(100));
        assert!(order.is_active_at(199));
        assert!(!order.is_active_at(200));
    }

    #[test]
    fn progress_tracks_elapsed_time() {
        let progress = order(1).progress_at(150);
        assert_eq!(progress, Progress::new(50, 100));
    }

    #[test]
    fn unfilled_status_leaves_all_units() {
        let status = OrderStatus::default();
        assert_eq!(status.remaining_units(U256::from(10)).unwrap(), U256::from(10));
        assert!(!status.is_fully_filled());
    }

    #[test]
    fn remaining_units_scale_from_status_fraction() {
        // 1/5 filled of a 10-unit order
        let status = OrderStatus {
            is_validated: true,
            is_cancelled: false,
            total_filled: U256::from(1),
            total_size: U256::from(5),
        };
        assert_eq!(status.remaining_units(U256::from(10)).unwrap(), U256::from(8));
    }

    #[test]
    fn fully_filled_status_has_no_remaining_units() {
        let status = OrderStatus {
            is_validated: true,
            is_cancelled: false,
            total_filled: U256::from(3),
            total_size: U256::from(3),
        };
        assert!(status.is_fully_filled());
        assert_eq!(status.remaining_units(U256::from(3)).unwrap(), U256::ZERO);
    }

    #[test]
    fn order_deserializes_from_camel_case_json() {
        let json = serde_json::to_string(&order(4)).unwrap();
        assert!(json.contains("totalOriginalConsiderationItems"));

        let parsed: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, order(4));
    }
}
