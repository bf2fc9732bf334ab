//! Settlement contract calldata.
//!
//! Basic calls use the compact single-pair entry point, standard calls fill
//! the whole order, advanced calls carry the fill fraction and recipient.
//! Tips travel as extra consideration items (additional recipients on the
//! basic route).

use alloy_primitives::aliases::U120;
use alloy_primitives::{Bytes, U256};
use alloy_sol_types::SolCall;

use super::contracts::{
    self, AdditionalRecipient, AdvancedOrder, BasicOrderParameters, ISettlement, OrderParameters,
};
use crate::domain::{ExchangeCall, FulfillmentStrategy, ItemType};
use crate::error::{ChainError, Result};
use crate::port::outbound::encode::CalldataEncoder;

/// ABI encoder for the settlement contract's fulfillment entry points.
#[derive(Debug, Clone, Copy, Default)]
pub struct SettlementEncoder;

impl CalldataEncoder for SettlementEncoder {
    fn encode(&self, call: &ExchangeCall) -> Result<Bytes> {
        if call.order.has_criteria_items() {
            return Err(encoding("criteria items need criteria resolvers"));
        }

        let calldata = match call.strategy {
            FulfillmentStrategy::Basic => ISettlement::fulfillBasicOrderCall {
                parameters: basic_parameters(call)?,
            }
            .abi_encode(),
            FulfillmentStrategy::Standard => ISettlement::fulfillOrderCall {
                order: contracts::Order {
                    parameters: order_parameters(call)?,
                    signature: call.order.signature.clone(),
                },
                fulfillerConduitKey: call.fulfiller_conduit_key,
            }
            .abi_encode(),
            FulfillmentStrategy::Advanced => ISettlement::fulfillAdvancedOrderCall {
                advancedOrder: AdvancedOrder {
                    parameters: order_parameters(call)?,
                    numerator: to_u120(call.fraction.numerator())?,
                    denominator: to_u120(call.fraction.denominator())?,
                    signature: call.order.signature.clone(),
                    extraData: Bytes::new(),
                },
                criteriaResolvers: Vec::new(),
                fulfillerConduitKey: call.fulfiller_conduit_key,
                recipient: call.recipient,
            }
            .abi_encode(),
        };

        Ok(Bytes::from(calldata))
    }
}

fn order_parameters(call: &ExchangeCall) -> Result<OrderParameters> {
    let order = &call.order;
    let offer = order
        .offer
        .iter()
        .map(|item| contracts::OfferItem {
            itemType: u8::from(item.item_type),
            token: item.token,
            identifierOrCriteria: item.identifier_or_criteria,
            startAmount: item.start_amount,
            endAmount: item.end_amount,
        })
        .collect();
    let consideration = call
        .order_consideration()?
        .into_iter()
        .map(|item| contracts::ConsiderationItem {
            itemType: u8::from(item.item_type),
            token: item.token,
            identifierOrCriteria: item.identifier_or_criteria,
            startAmount: item.start_amount,
            endAmount: item.end_amount,
            recipient: item.recipient,
        })
        .collect();

    Ok(OrderParameters {
        offerer: order.offerer,
        zone: order.zone,
        offer,
        consideration,
        orderType: u8::from(order.order_type),
        startTime: U256::from(order.start_time),
        endTime: U256::from(order.end_time),
        zoneHash: order.zone_hash,
        salt: order.salt,
        conduitKey: order.conduit_key,
        totalOriginalConsiderationItems: U256::from(order.total_original_consideration_items),
    })
}

/// Route index of a basic order, as laid out by the contract's basic order
/// type enum (four order types per route).
fn basic_route(offer: ItemType, payment: ItemType) -> Result<u8> {
    match (offer, payment) {
        (ItemType::Erc721, ItemType::Native) => Ok(0),
        (ItemType::Erc1155, ItemType::Native) => Ok(1),
        (ItemType::Erc721, ItemType::Erc20) => Ok(2),
        (ItemType::Erc1155, ItemType::Erc20) => Ok(3),
        (ItemType::Erc20, ItemType::Erc721) => Ok(4),
        (ItemType::Erc20, ItemType::Erc1155) => Ok(5),
        _ => Err(encoding(&format!(
            "no basic route pays {payment} for {offer}"
        ))),
    }
}

fn basic_parameters(call: &ExchangeCall) -> Result<BasicOrderParameters> {
    let order = &call.order;
    let [offer] = call.offer.as_slice() else {
        return Err(encoding("basic orders carry exactly one offer item"));
    };
    let Some((first, rest)) = call.consideration.split_first() else {
        return Err(encoding("basic orders need a consideration item"));
    };

    let route = basic_route(offer.item_type, first.item_type)?;
    let order_type = u8::from(order.order_type);
    let additional_recipients = rest
        .iter()
        .chain(call.tips.iter())
        .map(|item| AdditionalRecipient {
            amount: item.amount(),
            recipient: item.recipient,
        })
        .collect();

    Ok(BasicOrderParameters {
        considerationToken: first.token,
        considerationIdentifier: first.identifier_or_criteria,
        considerationAmount: first.amount(),
        offerer: order.offerer,
        zone: order.zone,
        offerToken: offer.token,
        offerIdentifier: offer.identifier_or_criteria,
        offerAmount: offer.start_amount,
        basicOrderType: order_type + 4 * route,
        startTime: U256::from(order.start_time),
        endTime: U256::from(order.end_time),
        zoneHash: order.zone_hash,
        salt: order.salt,
        offererConduitKey: order.conduit_key,
        fulfillerConduitKey: call.fulfiller_conduit_key,
        totalOriginalAdditionalRecipients: U256::from(
            order.total_original_consideration_items.saturating_sub(1),
        ),
        additionalRecipients: additional_recipients,
        signature: order.signature.clone(),
    })
}

fn to_u120(value: U256) -> Result<U120> {
    U120::checked_from_limbs_slice(value.as_limbs())
        .ok_or_else(|| encoding(&format!("fraction term {value} exceeds uint120")))
}

fn encoding(reason: &str) -> crate::error::Error {
    ChainError::Encoding(reason.to_string()).into()
}
