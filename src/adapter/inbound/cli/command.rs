//! Argument grammar of the `fillwright` binary.

use std::path::PathBuf;
use std::str::FromStr;

use alloy_primitives::{Address, B256, U256};
use clap::{Parser, Subcommand};

use crate::domain::Fee;

/// Fulfillment planner for partially fillable exchange orders
#[derive(Parser, Debug)]
#[command(name = "fillwright")]
#[command(version)]
pub struct Cli {
    /// Print machine-readable JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    /// Print only errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the fillwright CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Plan (and optionally execute) the fulfillment of a signed order
    Plan(PlanArgs),

    /// Print the calldata tag derived from a domain
    Tag(TagArgs),
}

/// Arguments for the `plan` subcommand.
#[derive(Parser, Debug)]
pub struct PlanArgs {
    /// Path to the signed order (JSON)
    #[arg(long)]
    pub order: PathBuf,

    /// Units of the first offer item to fill; defaults to everything that remains
    #[arg(long, value_parser = parse_units)]
    pub units: Option<U256>,

    /// Domain whose tag is appended to the settlement calldata
    #[arg(long)]
    pub domain: Option<String>,

    /// Receiver of the offer items; defaults to the signing account
    #[arg(long)]
    pub recipient: Option<Address>,

    /// Extra fee paid by the fulfiller, as `recipient:basis_points` (repeatable)
    #[arg(long = "tip", value_parser = parse_tip)]
    pub tips: Vec<Fee>,

    /// Conduit key the fulfiller's tokens move through
    #[arg(long)]
    pub conduit_key: Option<B256>,

    /// Submit every action after planning
    #[arg(long)]
    pub execute: bool,

    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,
}

/// Arguments for the `tag` subcommand.
#[derive(Parser, Debug)]
pub struct TagArgs {
    /// Domain to derive the tag from (e.g. `opensea.io`)
    pub domain: String,
}

fn parse_units(raw: &str) -> Result<U256, String> {
    let units = U256::from_str_radix(raw.trim(), 10).map_err(|e| e.to_string())?;
    if units.is_zero() {
        return Err("units must be greater than 0".to_string());
    }
    Ok(units)
}

fn parse_tip(raw: &str) -> Result<Fee, String> {
    let (recipient, basis_points) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected recipient:basis_points, got '{raw}'"))?;
    let recipient = Address::from_str(recipient.trim()).map_err(|e| e.to_string())?;
    let basis_points: u16 = basis_points.trim().parse().map_err(|e| format!("{e}"))?;
    if basis_points > 10_000 {
        return Err(format!("{basis_points} basis points exceeds 100%"));
    }
    Ok(Fee::new(recipient, basis_points))
}
