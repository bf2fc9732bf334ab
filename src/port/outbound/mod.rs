//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe the chain collaborators the planner depends on:
//! state queries, transaction submission, and settlement calldata encoding.

pub mod chain;
pub mod encode;
pub mod submit;
