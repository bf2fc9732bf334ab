//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports are the seams where the planner meets the chain. The planner reads
//! order status and approval state through [`outbound::chain::ChainReader`]
//! and hands every action it plans to an [`outbound::submit::TransactionSubmitter`].
//!
//! # Architecture
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │      Application        │
//!                    │  planner · resolver ·   │
//!                    │       sequencer         │
//!                    └───────────┬─────────────┘
//!                                │
//!            ┌───────────────────┼───────────────────┐
//!            ▼                   ▼                   ▼
//!     ┌─────────────┐    ┌───────────────┐   ┌───────────────┐
//!     │ ChainReader │    │  Transaction  │   │   Calldata    │
//!     │             │    │   Submitter   │   │   Encoder     │
//!     └─────────────┘    └───────────────┘   └───────────────┘
//! ```

pub mod outbound;
