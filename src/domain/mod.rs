//! Exchange-agnostic domain logic.
//!
//! Orders, items, fill fractions, and the fixed-point amount calculator. No
//! I/O happens in this layer.

pub mod amount;
pub mod error;

mod call;
mod fraction;
mod fulfillment;
mod item;
mod order;
mod tag;

// Amount calculator
pub use amount::{
    compute_amount, fee_amount, parse_base_units, to_base_units, Progress, Rounding,
    BASIS_POINTS_DIVISOR,
};

// Core domain types
pub use call::ExchangeCall;
pub use error::DomainError;
pub use fraction::FillFraction;
pub use fulfillment::FulfillmentStrategy;
pub use item::{ConsiderationItem, Fee, ItemType, OfferItem};
pub use order::{Order, OrderStatus, OrderType};
pub use tag::DomainTag;
