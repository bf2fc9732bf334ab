//! Composition root wiring EVM adapters into a planner.

use std::sync::Arc;

use tracing::info;

use crate::adapter::outbound::evm::{EvmChainReader, EvmSubmitter, SettlementEncoder};
use crate::application::FulfillmentPlanner;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::chain::ChainReader;
use crate::port::outbound::submit::TransactionSubmitter;

/// Build a planner reading from and submitting to the configured chain.
///
/// # Errors
///
/// Returns an error if the RPC URL or signing key is missing or invalid, or
/// the exchange section holds invalid values.
pub fn build_planner(config: &Config) -> Result<FulfillmentPlanner> {
    let settings = config.planner_settings()?;
    let rpc_url = config.network.url()?;

    let reader: Arc<dyn ChainReader> =
        Arc::new(EvmChainReader::new(rpc_url.clone(), settings.settlement));
    let submitter: Arc<dyn TransactionSubmitter> = Arc::new(EvmSubmitter::new(
        config.private_key()?,
        config.network.chain_id,
        rpc_url,
        Arc::new(SettlementEncoder),
    )?);

    info!(
        account = %submitter.account(),
        settlement = %settings.settlement,
        chain_id = config.network.chain_id,
        "Planner ready"
    );

    Ok(FulfillmentPlanner::new(settings, reader, submitter))
}
