//! Domain validation errors raised while planning a fulfillment.
//!
//! Every variant here is fatal for the request that produced it: the caller
//! has to correct its input (or re-query chain state) and plan again. None of
//! them are raised once a [`Plan`](crate::application::Plan) has been handed
//! out.
//!
//! # Examples
//!
//! ```
//! use alloy_primitives::U256;
//! use fillwright::domain::{DomainError, FillFraction};
//!
//! let result = FillFraction::new(U256::from(3), U256::from(2));
//! assert!(matches!(result, Err(DomainError::InvalidFraction { .. })));
//! ```

use alloy_primitives::{Address, B256, U256};
use thiserror::Error;

use super::order::OrderType;

/// Errors that occur when a fill request violates order or amount invariants.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Fill fraction is zero, exceeds one, has a zero denominator, or leaves
    /// a remainder on some item amount.
    #[error("invalid fill fraction {numerator}/{denominator}")]
    InvalidFraction {
        /// Units requested.
        numerator: U256,
        /// Total units of the order.
        denominator: U256,
    },

    /// The order type does not allow filling less than the whole order.
    #[error("order type {order_type} does not allow partial fills")]
    UnsupportedPartialFill {
        /// Type of the order being filled.
        order_type: OrderType,
    },

    /// More units were requested than remain fillable.
    #[error("requested {requested} units but only {remaining} remain fillable")]
    InsufficientRemainingUnits {
        /// Units requested by the caller.
        requested: U256,
        /// Units still fillable according to the queried order status.
        remaining: U256,
    },

    /// The order has been cancelled on chain.
    #[error("order {order_hash} is cancelled")]
    OrderCancelled {
        /// Hash of the cancelled order.
        order_hash: B256,
    },

    /// The order is outside its active window.
    #[error("order is not active at {now} (active from {start_time} until {end_time})")]
    OrderNotActive {
        /// Timestamp the plan was built for.
        now: u64,
        /// Order start time.
        start_time: u64,
        /// Order end time (exclusive).
        end_time: u64,
    },

    /// Orders must offer at least one item.
    #[error("order has no offer items")]
    EmptyOffer,

    /// Fewer consideration items than the signed original count.
    #[error("order carries {actual} consideration items, expected at least {expected}")]
    MissingOriginalConsiderationItems {
        /// `totalOriginalConsiderationItems` from the order.
        expected: usize,
        /// Consideration items actually present.
        actual: usize,
    },

    /// An intermediate product exceeded 256 bits.
    #[error("amount overflow while computing {context}")]
    AmountOverflow {
        /// Which computation overflowed.
        context: &'static str,
    },

    /// A decimal amount cannot be represented in token base units.
    #[error("invalid amount {amount}: {reason}")]
    InvalidAmount {
        /// The offending literal.
        amount: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Tips need a payment currency to be denominated in.
    #[error("tips require a native or ERC-20 payment item")]
    TipsWithoutCurrency,

    /// The fulfiller's conduit key is not registered.
    #[error("no conduit registered for key {conduit_key}")]
    UnknownConduit {
        /// The unregistered key.
        conduit_key: B256,
    },

    /// The request account differs from the account that would sign.
    #[error("request account {expected} does not match signer {actual}")]
    SignerMismatch {
        /// Account named in the request.
        expected: Address,
        /// Account of the transaction submitter.
        actual: Address,
    },
}
