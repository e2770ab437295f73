//! Utils

use clap::Parser;
use thiserror::Error;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::selection::parse_pump_count;

/// Errors from the demo helpers
#[derive(Debug, Error)]
pub enum UtilsError {
    /// A `--flavor` value is not `NAME=PUMPS`
    #[error("Invalid flavor pour {0:?}, expected NAME=PUMPS")]
    InvalidPour(String),

    /// A global subscriber is already installed
    #[error("Failed to initialise logging: {0}")]
    Logging(#[from] tracing_subscriber::util::TryInitError),
}

/// Arguments for the quote example
#[derive(Debug, Parser)]
pub struct ExampleQuoteArgs {
    /// Fixture set to use for the catalog & pricing
    #[clap(short, long, default_value = "kratom")]
    pub fixture: String,

    /// Size to select
    #[clap(short, long)]
    pub size: Option<String>,

    /// Strain to add
    #[clap(long)]
    pub strain: Option<String>,

    /// Flavor pour as NAME=PUMPS, repeatable
    #[clap(long = "flavor", value_parser = parse_pour)]
    pub flavors: Vec<(String, u32)>,

    /// Booster to add, repeatable
    #[clap(short, long = "booster")]
    pub boosters: Vec<String>,

    /// Ice level, e.g. "Premium Ice"
    #[clap(long)]
    pub ice: Option<String>,

    /// Number of drinks
    #[clap(short, long, default_value_t = 1)]
    pub quantity: u32,

    /// Log level used when `RUST_LOG` is not set
    #[clap(long, default_value = "warn")]
    pub log_level: String,
}

/// Parse a `NAME=PUMPS` flavor pour.
///
/// # Errors
///
/// Returns [`UtilsError::InvalidPour`] if there is no `=` or the name is blank. The pump count
/// follows the widget's input rules, so junk counts become zero rather than errors.
pub fn parse_pour(raw: &str) -> Result<(String, u32), UtilsError> {
    let (name, pumps) = raw
        .split_once('=')
        .ok_or_else(|| UtilsError::InvalidPour(raw.to_string()))?;

    let name = name.trim();

    if name.is_empty() {
        return Err(UtilsError::InvalidPour(raw.to_string()));
    }

    Ok((name.to_string(), parse_pump_count(pumps)))
}

/// Install a compact fmt subscriber filtered by `RUST_LOG`, or `log_level` when unset.
///
/// # Errors
///
/// Returns [`UtilsError::Logging`] if a global subscriber is already installed.
pub fn init_tracing(log_level: &str) -> Result<(), UtilsError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{log_level},barista={log_level}")));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .try_init()?;

    Ok(())
}
