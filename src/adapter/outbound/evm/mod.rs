//! EVM adapters: JSON-RPC chain reads, signed submission and settlement
//! calldata encoding.

pub mod contracts;

mod encoder;
mod reader;
mod submitter;

pub use encoder::SettlementEncoder;
pub use reader::EvmChainReader;
pub use submitter::EvmSubmitter;
