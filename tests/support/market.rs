//! Per-test market fixture: one ledger, one offerer, one fulfiller.

use std::sync::Arc;

use alloy_primitives::{Address, U256};
use fillwright::application::{FulfillRequest, FulfillmentPlanner, PlannerSettings};
use fillwright::domain::Order;
use fillwright::port::outbound::chain::ChainReader;
use fillwright::testkit::domain::address;
use fillwright::testkit::ledger::MemoryLedger;

pub const SETTLEMENT: u8 = 0xee;
pub const OFFERER: u8 = 0x01;
pub const FULFILLER: u8 = 0x02;
pub const FEE_RECIPIENT: u8 = 0x03;
pub const COLLECTION: u8 = 0x10;
pub const CURRENCY: u8 = 0x20;

pub struct Market {
    pub ledger: Arc<MemoryLedger>,
    pub planner: FulfillmentPlanner,
}

impl Market {
    pub fn new() -> Self {
        Self::with_settings(PlannerSettings::new(address(SETTLEMENT)))
    }

    pub fn with_settings(settings: PlannerSettings) -> Self {
        let ledger = MemoryLedger::new(address(SETTLEMENT));
        let planner = FulfillmentPlanner::new(
            settings,
            Arc::clone(&ledger) as Arc<dyn ChainReader>,
            ledger.signer(fulfiller()),
        );
        Self { ledger, planner }
    }

    /// Request filling `units` of `order` as the fulfiller.
    pub fn request(&self, order: &Order, units: u64) -> FulfillRequest {
        self.request_units(order, U256::from(units))
    }

    /// Request for orders sold in base units, such as an ERC-20 offer.
    pub fn request_units(&self, order: &Order, units: U256) -> FulfillRequest {
        FulfillRequest::new(order.clone(), fulfiller()).units(units)
    }

    /// Give the offerer `amount` of token 1 in the collection, approved for
    /// the settlement contract.
    pub fn list_erc1155(&self, amount: u64) {
        self.ledger
            .mint_erc1155(collection(), token_id(), offerer(), U256::from(amount));
        self.ledger
            .set_approval_for_all(collection(), offerer(), settlement());
    }
}

pub fn settlement() -> Address {
    address(SETTLEMENT)
}

pub fn offerer() -> Address {
    address(OFFERER)
}

pub fn fulfiller() -> Address {
    address(FULFILLER)
}

pub fn fee_recipient() -> Address {
    address(FEE_RECIPIENT)
}

pub fn collection() -> Address {
    address(COLLECTION)
}

pub fn currency() -> Address {
    address(CURRENCY)
}

pub fn token_id() -> U256 {
    U256::from(1)
}
