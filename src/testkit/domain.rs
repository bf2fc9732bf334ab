//! Builders for orders and amounts used across tests.
//!
//! Every test constructs its own accounts, tokens and orders through these
//! helpers so no state is shared between tests.

use std::sync::atomic::{AtomicU64, Ordering};

use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use rust_decimal::Decimal;

use crate::domain::{
    fee_amount, to_base_units, ConsiderationItem, ExchangeCall, Fee, FillFraction,
    FulfillmentStrategy, ItemType, OfferItem, Order, OrderType, Rounding,
};

static NEXT_SALT: AtomicU64 = AtomicU64::new(1);

/// Deterministic address ending in `n`.
pub fn address(n: u8) -> Address {
    Address::with_last_byte(n)
}

/// Scale a decimal amount to base units. Panics on literals the token
/// cannot represent.
pub fn units(amount: impl Into<Decimal>, decimals: u32) -> U256 {
    let amount = amount.into();
    match to_base_units(amount, decimals) {
        Ok(value) => value,
        Err(e) => panic!("cannot scale {amount} to {decimals} decimals: {e}"),
    }
}

/// Ether amount in wei.
pub fn ether(amount: impl Into<Decimal>) -> U256 {
    units(amount, 18)
}

/// Fluent builder for signed orders.
///
/// Fees registered with [`fees`](Self::fees) are carved out of the first
/// consideration item at build time, rounding down, the way marketplaces
/// split a listing price between seller and fee recipients.
#[derive(Debug, Clone)]
pub struct OrderBuilder {
    offerer: Address,
    zone: Address,
    offer: Vec<OfferItem>,
    consideration: Vec<ConsiderationItem>,
    fees: Vec<Fee>,
    order_type: OrderType,
    start_time: u64,
    end_time: u64,
    conduit_key: B256,
}

impl OrderBuilder {
    pub fn new(offerer: Address) -> Self {
        Self {
            offerer,
            zone: Address::ZERO,
            offer: Vec::new(),
            consideration: Vec::new(),
            fees: Vec::new(),
            order_type: OrderType::FullOpen,
            start_time: 0,
            end_time: u64::MAX,
            conduit_key: B256::ZERO,
        }
    }

    pub fn offer_item(mut self, item: OfferItem) -> Self {
        self.offer.push(item);
        self
    }

    pub fn offer_erc20(self, token: Address, amount: U256) -> Self {
        self.offer_item(OfferItem {
            item_type: ItemType::Erc20,
            token,
            identifier_or_criteria: U256::ZERO,
            start_amount: amount,
            end_amount: amount,
        })
    }

    pub fn offer_erc721(self, token: Address, id: U256) -> Self {
        self.offer_item(OfferItem {
            item_type: ItemType::Erc721,
            token,
            identifier_or_criteria: id,
            start_amount: U256::from(1),
            end_amount: U256::from(1),
        })
    }

    pub fn offer_erc1155(self, token: Address, id: U256, amount: U256) -> Self {
        self.offer_item(OfferItem {
            item_type: ItemType::Erc1155,
            token,
            identifier_or_criteria: id,
            start_amount: amount,
            end_amount: amount,
        })
    }

    pub fn consider_item(mut self, item: ConsiderationItem) -> Self {
        self.consideration.push(item);
        self
    }

    pub fn consider_native(self, amount: U256, recipient: Address) -> Self {
        self.consider_item(ConsiderationItem {
            item_type: ItemType::Native,
            token: Address::ZERO,
            identifier_or_criteria: U256::ZERO,
            start_amount: amount,
            end_amount: amount,
            recipient,
        })
    }

    pub fn consider_erc20(self, token: Address, amount: U256, recipient: Address) -> Self {
        self.consider_item(ConsiderationItem {
            item_type: ItemType::Erc20,
            token,
            identifier_or_criteria: U256::ZERO,
            start_amount: amount,
            end_amount: amount,
            recipient,
        })
    }

    pub fn consider_erc721(self, token: Address, id: U256, recipient: Address) -> Self {
        self.consider_item(ConsiderationItem {
            item_type: ItemType::Erc721,
            token,
            identifier_or_criteria: id,
            start_amount: U256::from(1),
            end_amount: U256::from(1),
            recipient,
        })
    }

    pub fn consider_erc1155(
        self,
        token: Address,
        id: U256,
        amount: U256,
        recipient: Address,
    ) -> Self {
        self.consider_item(ConsiderationItem {
            item_type: ItemType::Erc1155,
            token,
            identifier_or_criteria: id,
            start_amount: amount,
            end_amount: amount,
            recipient,
        })
    }

    /// Marketplace fees split out of the first consideration item.
    pub fn fees(mut self, fees: &[Fee]) -> Self {
        self.fees.extend_from_slice(fees);
        self
    }

    pub fn partial(self) -> Self {
        self.order_type(OrderType::PartialOpen)
    }

    pub fn order_type(mut self, order_type: OrderType) -> Self {
        self.order_type = order_type;
        self
    }

    pub fn zone(mut self, zone: Address) -> Self {
        self.zone = zone;
        self
    }

    pub fn window(mut self, start_time: u64, end_time: u64) -> Self {
        self.start_time = start_time;
        self.end_time = end_time;
        self
    }

    pub fn conduit_key(mut self, key: B256) -> Self {
        self.conduit_key = key;
        self
    }

    pub fn build(self) -> Order {
        let consideration = split_fees(self.consideration, &self.fees);
        let salt = U256::from(NEXT_SALT.fetch_add(1, Ordering::Relaxed));

        let mut preimage = Vec::with_capacity(84);
        preimage.extend_from_slice(self.offerer.as_slice());
        preimage.extend_from_slice(&salt.to_be_bytes::<32>());
        preimage.extend_from_slice(&self.start_time.to_be_bytes());
        preimage.extend_from_slice(&self.end_time.to_be_bytes());
        preimage.extend_from_slice(self.conduit_key.as_slice());

        Order {
            offerer: self.offerer,
            zone: self.zone,
            total_original_consideration_items: consideration.len(),
            offer: self.offer,
            consideration,
            order_type: self.order_type,
            start_time: self.start_time,
            end_time: self.end_time,
            zone_hash: B256::ZERO,
            salt,
            conduit_key: self.conduit_key,
            counter: U256::ZERO,
            signature: Bytes::new(),
            hash: keccak256(&preimage),
        }
    }
}

fn split_fees(mut consideration: Vec<ConsiderationItem>, fees: &[Fee]) -> Vec<ConsiderationItem> {
    let Some(first) = consideration.first().cloned() else {
        return consideration;
    };

    let mut start_left = first.start_amount;
    let mut end_left = first.end_amount;
    let mut fee_items = Vec::with_capacity(fees.len());
    for fee in fees {
        let start = fee_slice(first.start_amount, fee.basis_points);
        let end = fee_slice(first.end_amount, fee.basis_points);
        start_left -= start;
        end_left -= end;
        fee_items.push(ConsiderationItem {
            start_amount: start,
            end_amount: end,
            recipient: fee.recipient,
            ..first.clone()
        });
    }

    consideration[0].start_amount = start_left;
    consideration[0].end_amount = end_left;
    consideration.extend(fee_items);
    consideration
}

fn fee_slice(amount: U256, basis_points: u16) -> U256 {
    match fee_amount(amount, basis_points, Rounding::Down) {
        Ok(value) => value,
        Err(e) => panic!("fee of {basis_points} bps on {amount} overflows: {e}"),
    }
}

/// Whole-order exchange call with amounts taken verbatim from the order.
pub fn full_fill_call(order: &Order, settlement: Address, fulfiller: Address) -> ExchangeCall {
    let fraction = FillFraction::full();
    let value = order
        .consideration
        .iter()
        .filter(|item| item.item_type.is_native())
        .fold(U256::ZERO, |sum, item| sum + item.start_amount);

    ExchangeCall {
        settlement,
        strategy: FulfillmentStrategy::select(order, &fraction, false),
        order: order.clone(),
        fraction,
        offer: order.offer.clone(),
        consideration: order.consideration.clone(),
        tips: Vec::new(),
        fulfiller,
        recipient: fulfiller,
        fulfiller_conduit_key: B256::ZERO,
        value,
        domain_tag: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn fees_are_carved_out_of_the_first_item() {
        let order = OrderBuilder::new(address(1))
            .offer_erc1155(address(2), U256::from(1), U256::from(10))
            .consider_native(ether(10), address(1))
            .fees(&[Fee::new(address(3), 250)])
            .build();

        assert_eq!(order.consideration.len(), 2);
        assert_eq!(order.total_original_consideration_items, 2);
        assert_eq!(order.consideration[0].start_amount, ether(dec!(9.75)));
        assert_eq!(order.consideration[1].start_amount, ether(dec!(0.25)));
        assert_eq!(order.consideration[1].recipient, address(3));
    }

    #[test]
    fn each_build_gets_a_distinct_hash() {
        let builder = OrderBuilder::new(address(1)).offer_erc721(address(2), U256::from(1));
        assert_ne!(builder.clone().build().hash, builder.build().hash);
    }
}
