//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`ledger`] - [`MemoryLedger`](ledger::MemoryLedger), an in-memory chain
//!   implementing both outbound ports with settlement-contract checks.
//! - [`domain`] - Builders for orders, accounts and amounts.

pub mod domain;
pub mod ledger;
