pub mod client;
pub mod error;
mod retry;
pub mod sink;
pub mod snapshot;
pub mod types;

pub use client::{ClientSettings, MarketClient, DEFAULT_BASE_URL};
pub use error::{ErrorClass, MarketError};
pub use sink::{PriceBatchSink, StockBatchSink};
pub use snapshot::{
    build_offer_snapshot, collect_stocks, DataIssue, OfferSnapshot, SnapshotOptions,
    StockSnapshot,
};
pub use types::{Campaign, OfferPage, PriceInfo, StockPage};
