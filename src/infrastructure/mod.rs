//! Infrastructure layer.
//!
//! Provides technical concerns that support the application without containing
//! business logic.
//!
//! # Submodules
//!
//! - [`config`] - Configuration loading and validation
//! - [`bootstrap`] - Composition root wiring EVM adapters into a planner
//!   (requires the `evm` feature)

pub mod config;

#[cfg(feature = "evm")]
pub mod bootstrap;
