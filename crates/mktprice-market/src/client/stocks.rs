//! Warehouse stock endpoints.

use mktprice_core::{StockChange, SubmitStatus};
use reqwest::Method;

use crate::error::MarketError;
use crate::types::{
    ApiEnvelope, StatusResponse, StockPage, StockUpdateItem, StockUpdateRequest, StockUpdateSku,
    StocksRequest, StocksResult,
};

use super::offers::status_of;
use super::MarketClient;

impl MarketClient {
    /// Fetches one page of warehouse stocks for a campaign.
    ///
    /// # Errors
    ///
    /// Propagates request and decoding failures from the API.
    pub async fn list_stocks(
        &self,
        campaign_id: u64,
        page_token: Option<&str>,
        limit: u32,
    ) -> Result<StockPage, MarketError> {
        let envelope: ApiEnvelope<StocksResult> = self
            .request_json(
                Method::POST,
                &format!("campaigns/{campaign_id}/offers/stocks"),
                &[],
                Some(&StocksRequest { page_token, limit }),
            )
            .await?;

        let result = envelope.result.unwrap_or_default();
        Ok(StockPage {
            next_page_token: result.paging.next().map(str::to_owned),
            warehouses: result.warehouses,
        })
    }

    /// Replaces stock counts for one batch of offers.
    ///
    /// # Errors
    ///
    /// Propagates request and decoding failures from the API.
    pub async fn submit_stock_batch(
        &self,
        campaign_id: u64,
        items: &[StockChange],
    ) -> Result<SubmitStatus, MarketError> {
        let request = StockUpdateRequest {
            skus: items
                .iter()
                .map(|change| StockUpdateSku {
                    sku: &change.offer_id,
                    warehouse_id: change.warehouse_id,
                    items: [StockUpdateItem {
                        count: change.new_count,
                        stock_type: change.stock_type.as_str(),
                    }],
                })
                .collect(),
        };

        let response: StatusResponse = self
            .request_json(
                Method::PUT,
                &format!("campaigns/{campaign_id}/offers/stocks"),
                &[],
                Some(&request),
            )
            .await?;

        Ok(status_of(&response))
    }
}
