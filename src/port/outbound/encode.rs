//! Settlement calldata encoding port.

use alloy_primitives::Bytes;

use crate::domain::ExchangeCall;
use crate::error::Result;

/// Encodes a planned exchange call into settlement contract calldata.
///
/// Implementations select the entry point from
/// [`ExchangeCall::strategy`](crate::domain::ExchangeCall::strategy). The
/// domain tag is appended afterwards by the submitter, so encoders must not
/// add it themselves.
pub trait CalldataEncoder: Send + Sync {
    /// Encode the call.
    ///
    /// # Errors
    ///
    /// Returns an error if the call cannot be expressed by the contract ABI.
    fn encode(&self, call: &ExchangeCall) -> Result<Bytes>;
}
