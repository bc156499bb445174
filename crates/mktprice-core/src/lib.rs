//! Domain model and decision logic for marketplace price and stock updates.
//!
//! Everything in this crate is free of network I/O: the snapshot of offers is
//! produced by `mktprice-market`, and the mutations are submitted through the
//! [`dispatch::BatchSubmitter`] seam.

pub mod app_config;
pub mod config;
pub mod dispatch;
pub mod filter;
pub mod offer;
pub mod pricing;
pub mod reconcile;
pub mod stock;

use thiserror::Error;

pub use app_config::{AppConfig, CampaignChoice};
pub use config::{load_app_config, load_app_config_from_env, ConfigOverrides};
pub use dispatch::{dispatch_batches, BatchResult, BatchSubmitter, DispatchOptions, SubmitStatus};
pub use filter::{apply_filters, validate_bounds, FilterError, FilterSet};
pub use offer::{Offer, OfferStatus};
pub use pricing::{compute_price, PriceBounds, PriceQuote, PriceStrategy};
pub use reconcile::{
    reconcile, AuditEntry, AuditStatus, PriceChangePlan, Reconciliation, MATERIALITY_THRESHOLD,
};
pub use stock::{plan_stock_increase, StockChange, StockEntry, StockType};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to load env file {path}: {reason}")]
    EnvFile { path: String, reason: String },
}
