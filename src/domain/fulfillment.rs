//! Settlement entry point selection.

use std::fmt;

use super::fraction::FillFraction;
use super::item::{ConsiderationItem, ItemType, OfferItem};
use super::order::Order;

/// Which settlement entry point the exchange call targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FulfillmentStrategy {
    /// Compact single-item route for plain listings and offers.
    Basic,
    /// Whole-order fulfillment.
    Standard,
    /// Fractional fills, criteria items, contract orders, custom recipients.
    Advanced,
}

impl FulfillmentStrategy {
    /// Pick the cheapest entry point that can express the fill.
    #[must_use]
    pub fn select(order: &Order, fraction: &FillFraction, custom_recipient: bool) -> Self {
        if !fraction.is_full()
            || custom_recipient
            || order.order_type.is_contract()
            || order.has_criteria_items()
        {
            return Self::Advanced;
        }
        if is_basic_route(order) {
            Self::Basic
        } else {
            Self::Standard
        }
    }
}

impl fmt::Display for FulfillmentStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Basic => "basic",
            Self::Standard => "standard",
            Self::Advanced => "advanced",
        };
        f.write_str(name)
    }
}

/// Basic routes pair one collection item with one currency.
///
/// Listings offer a single ERC-721/1155 for native or ERC-20 payment, with the
/// first payment going to the offerer. Offers give a single ERC-20 for a
/// collection item, with the remaining items paying fees in that same token.
fn is_basic_route(order: &Order) -> bool {
    let [offer] = order.offer.as_slice() else {
        return false;
    };
    let Some((first, rest)) = order.consideration.split_first() else {
        return false;
    };
    if first.recipient != order.offerer || !order.has_static_amounts() {
        return false;
    }

    match offer.item_type {
        ItemType::Erc721 | ItemType::Erc1155 => is_listing_payment(first, rest),
        ItemType::Erc20 => is_offer_payment(offer, first, rest),
        _ => false,
    }
}

fn is_listing_payment(first: &ConsiderationItem, rest: &[ConsiderationItem]) -> bool {
    first.item_type.is_currency()
        && first.identifier_or_criteria.is_zero()
        && rest.iter().all(|item| {
            item.item_type == first.item_type
                && item.token == first.token
                && item.identifier_or_criteria.is_zero()
        })
}

fn is_offer_payment(offer: &OfferItem, first: &ConsiderationItem, rest: &[ConsiderationItem]) -> bool {
    matches!(first.item_type, ItemType::Erc721 | ItemType::Erc1155)
        && rest
            .iter()
            .all(|item| item.item_type == ItemType::Erc20 && item.token == offer.token)
}
