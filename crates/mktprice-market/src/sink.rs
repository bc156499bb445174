//! [`BatchSubmitter`] adapters over [`MarketClient`].

use mktprice_core::{BatchSubmitter, PriceChangePlan, StockChange, SubmitStatus};

use crate::client::MarketClient;
use crate::error::MarketError;

/// Sends price plans to the business-level price update endpoint.
pub struct PriceBatchSink<'a> {
    client: &'a MarketClient,
    business_id: u64,
}

impl<'a> PriceBatchSink<'a> {
    #[must_use]
    pub fn new(client: &'a MarketClient, business_id: u64) -> Self {
        Self {
            client,
            business_id,
        }
    }
}

impl BatchSubmitter<PriceChangePlan> for PriceBatchSink<'_> {
    type Error = MarketError;

    async fn submit(&self, batch: &[PriceChangePlan]) -> Result<SubmitStatus, MarketError> {
        self.client.submit_price_batch(self.business_id, batch).await
    }
}

/// Sends stock changes to the campaign stock endpoint.
pub struct StockBatchSink<'a> {
    client: &'a MarketClient,
    campaign_id: u64,
}

impl<'a> StockBatchSink<'a> {
    #[must_use]
    pub fn new(client: &'a MarketClient, campaign_id: u64) -> Self {
        Self {
            client,
            campaign_id,
        }
    }
}

impl BatchSubmitter<StockChange> for StockBatchSink<'_> {
    type Error = MarketError;

    async fn submit(&self, batch: &[StockChange]) -> Result<SubmitStatus, MarketError> {
        self.client.submit_stock_batch(self.campaign_id, batch).await
    }
}
