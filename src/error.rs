//! Crate-wide error type.
//!
//! Each layer has its own enum; [`Error`] composes them so `?` works across
//! layer boundaries.

use alloy_primitives::{Address, B256};
use thiserror::Error;

use crate::domain::error::DomainError;

/// Problems with the config file or the environment it is read with.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Errors reported by chain collaborators (queries and transactions).
#[derive(Error, Debug)]
pub enum ChainError {
    #[error("chain query failed: {0}")]
    Query(String),

    #[error("transaction failed: {0}")]
    Transaction(String),

    #[error("transaction {tx_hash} reverted")]
    Reverted { tx_hash: B256 },

    #[error("calldata encoding failed: {0}")]
    Encoding(String),
}

/// Plan execution errors.
///
/// The collaborator's error is kept as the source so callers can inspect it
/// unchanged.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("approval of {token} for operator {operator} failed: {source}")]
    ApprovalSubmissionFailed {
        token: Address,
        operator: Address,
        #[source]
        source: Box<Error>,
    },

    #[error("exchange submission failed: {source}")]
    ExchangeSubmissionFailed {
        #[source]
        source: Box<Error>,
    },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
