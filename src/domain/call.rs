//! The settlement call a plan ends with.

use alloy_primitives::{Address, Bytes, B256, U256};

use super::amount::{mul_div, Rounding};
use super::error::DomainError;
use super::fraction::FillFraction;
use super::fulfillment::FulfillmentStrategy;
use super::item::{ConsiderationItem, OfferItem};
use super::order::Order;
use super::tag::DomainTag;

/// Everything the settlement collaborator needs to encode and send the
/// fulfillment.
///
/// `offer`, `consideration` and `tips` hold the effective amounts for this
/// fill (each item pinned to a single amount); `order` is the signed order as
/// it must be passed to the contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeCall {
    /// Settlement contract the call is sent to.
    pub settlement: Address,
    pub strategy: FulfillmentStrategy,
    pub order: Order,
    /// Fill fraction in lowest terms.
    pub fraction: FillFraction,
    pub offer: Vec<OfferItem>,
    pub consideration: Vec<ConsiderationItem>,
    /// Fulfiller-supplied fee items appended after the order's consideration.
    pub tips: Vec<ConsiderationItem>,
    pub fulfiller: Address,
    /// Receiver of the offer items.
    pub recipient: Address,
    pub fulfiller_conduit_key: B256,
    /// Native currency sent along with the call.
    pub value: U256,
    pub domain_tag: Option<DomainTag>,
}

impl ExchangeCall {
    /// Append the domain tag, if any, to encoded calldata.
    ///
    /// Calldata is returned unchanged when no tag is set.
    #[must_use]
    pub fn tag_calldata(&self, calldata: Bytes) -> Bytes {
        match self.domain_tag {
            Some(tag) => tag.append_to(&calldata),
            None => calldata,
        }
    }

    /// Consideration items followed by tips.
    pub fn payments(&self) -> impl Iterator<Item = &ConsiderationItem> {
        self.consideration.iter().chain(self.tips.iter())
    }

    /// The order's consideration with tips appended, in whole-order terms.
    ///
    /// The settlement contract applies the fill fraction to every
    /// consideration item it receives, tips included, so tips are scaled up
    /// by `denominator / numerator` here. Planned tip amounts are multiples of
    /// the reduced numerator, which makes the scaling exact.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::AmountOverflow`] if a scaled tip overflows.
    pub fn order_consideration(&self) -> Result<Vec<ConsiderationItem>, DomainError> {
        let mut items = self.order.consideration.clone();
        for tip in &self.tips {
            let amount = mul_div(
                tip.amount(),
                self.fraction.denominator(),
                self.fraction.numerator(),
                Rounding::Up,
                "tip scaling",
            )?;
            items.push(tip.with_amount(amount));
        }
        Ok(items)
    }
}
