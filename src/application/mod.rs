//! Application services (use cases).
//!
//! The planner validates a fill request and derives its plan; the resolver
//! decides which approvals are missing; the sequencer orders the result and
//! runs it.

pub mod action;
pub mod approval;
pub mod planner;
pub mod sequencer;

pub use action::{Action, ApprovalAction, ApprovalKind, ExchangeAction};
pub use approval::{group_requirements, resolve_approvals, ApprovalRequirement};
pub use planner::{FulfillRequest, FulfillmentPlanner, PlannerSettings};
pub use sequencer::{sequence, Plan};
