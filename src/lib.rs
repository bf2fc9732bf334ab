//! Fillwright - fulfillment planning for partially fillable exchange orders.
//!
//! Given a signed order, the number of units to fill and the fulfilling
//! account, the planner validates the request against on-chain state and
//! returns an ordered list of executable actions: the token approvals the
//! account still lacks, followed by exactly one settlement call.
//!
//! # Architecture
//!
//! - **`domain`** - Orders, items, fill fractions and the fixed-point amount
//!   calculator. Pure, no I/O.
//! - **`port`** - Chain seams: state queries, transaction submission and
//!   calldata encoding.
//! - **`application`** - Approval resolution, action sequencing and the
//!   fulfillment planner.
//! - **`adapter`** - EVM implementations of the ports and the CLI (requires
//!   the `evm` feature).
//! - **`infrastructure`** - Configuration loading and adapter wiring.
//! - **`testkit`** - Order builders and an in-memory ledger (requires the
//!   `testkit` feature).
//!
//! # Features
//!
//! - `evm` - JSON-RPC chain access and the `fillwright` binary (default)
//! - `testkit` - Test fixtures for downstream crates
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use fillwright::application::{FulfillRequest, FulfillmentPlanner, PlannerSettings};
//! use fillwright::domain::Order;
//! use fillwright::port::outbound::chain::ChainReader;
//! use fillwright::port::outbound::submit::TransactionSubmitter;
//!
//! async fn fill(
//!     order: Order,
//!     settings: PlannerSettings,
//!     reader: Arc<dyn ChainReader>,
//!     submitter: Arc<dyn TransactionSubmitter>,
//! ) -> fillwright::error::Result<()> {
//!     let account = submitter.account();
//!     let planner = FulfillmentPlanner::new(settings, reader, submitter);
//!     let plan = planner.plan(FulfillRequest::new(order, account)).await?;
//!     plan.execute_all().await?;
//!     Ok(())
//! }
//! ```

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(feature = "evm")]
pub mod adapter;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
