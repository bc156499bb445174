//! Catalog listing and price endpoints.

use std::collections::HashMap;

use mktprice_core::{PriceChangePlan, SubmitStatus};
use reqwest::Method;

use crate::error::MarketError;
use crate::types::{
    parse_price_value, ApiEnvelope, OfferMappingsResult, OfferPage, OfferPricesRequest,
    OfferPricesResult, PriceInfo, PriceUpdateItem, PriceUpdateRequest, PriceValue, StatusResponse,
};

use super::MarketClient;

/// Largest `offerIds` list the price endpoint accepts per call.
pub const PRICE_LOOKUP_CHUNK: usize = 1000;

impl MarketClient {
    /// Fetches one page of the business catalog.
    ///
    /// # Errors
    ///
    /// Propagates request and decoding failures from the API.
    pub async fn list_offers(
        &self,
        business_id: u64,
        page_token: Option<&str>,
        limit: u32,
    ) -> Result<OfferPage, MarketError> {
        let mut query = vec![("limit", limit.to_string())];
        if let Some(token) = page_token {
            query.push(("page_token", token.to_owned()));
        }

        let envelope: ApiEnvelope<OfferMappingsResult> = self
            .request_json(
                Method::POST,
                &format!("businesses/{business_id}/offer-mappings"),
                &query,
                Some(&serde_json::json!({})),
            )
            .await?;

        let result = envelope.result.unwrap_or_default();
        Ok(OfferPage {
            next_page_token: result.paging.next().map(str::to_owned),
            items: result.offer_mappings,
        })
    }

    /// Fetches campaign prices for `offer_ids`, chunked by
    /// [`PRICE_LOOKUP_CHUNK`]. Offers the campaign does not price are absent
    /// from the map.
    ///
    /// # Errors
    ///
    /// Propagates the first failing chunk.
    pub async fn get_prices(
        &self,
        campaign_id: u64,
        offer_ids: &[String],
    ) -> Result<HashMap<String, PriceInfo>, MarketError> {
        let mut prices = HashMap::with_capacity(offer_ids.len());
        let path = format!("campaigns/{campaign_id}/offer-prices");

        for (index, chunk) in offer_ids.chunks(PRICE_LOOKUP_CHUNK).enumerate() {
            tracing::debug!(chunk = index + 1, size = chunk.len(), "fetching campaign prices");
            let envelope: ApiEnvelope<OfferPricesResult> = self
                .request_json(
                    Method::POST,
                    &path,
                    &[],
                    Some(&OfferPricesRequest { offer_ids: chunk }),
                )
                .await?;

            for offer in envelope.result.unwrap_or_default().offers {
                let (price, currency) = match offer.price {
                    Some(raw) => (
                        raw.value.as_ref().and_then(parse_price_value),
                        raw.currency_id,
                    ),
                    None => (None, None),
                };
                prices.insert(
                    offer.offer_id,
                    PriceInfo {
                        price,
                        currency,
                        updated_at: offer.updated_at,
                    },
                );
            }
        }

        tracing::info!(requested = offer_ids.len(), priced = prices.len(), "fetched campaign prices");
        Ok(prices)
    }

    /// Submits one batch of business-level price updates.
    ///
    /// A 2xx answer whose status is not `"OK"` is reported as
    /// [`SubmitStatus::Rejected`].
    ///
    /// # Errors
    ///
    /// Propagates request and decoding failures from the API.
    pub async fn submit_price_batch(
        &self,
        business_id: u64,
        items: &[PriceChangePlan],
    ) -> Result<SubmitStatus, MarketError> {
        let request = PriceUpdateRequest {
            offers: items
                .iter()
                .map(|plan| PriceUpdateItem {
                    offer_id: &plan.offer_id,
                    price: PriceValue {
                        value: plan.price,
                        currency_id: &plan.currency,
                    },
                })
                .collect(),
        };

        let response: StatusResponse = self
            .request_json(
                Method::POST,
                &format!("businesses/{business_id}/offer-prices/updates"),
                &[],
                Some(&request),
            )
            .await?;

        Ok(status_of(&response))
    }
}

pub(super) fn status_of(response: &StatusResponse) -> SubmitStatus {
    if response.is_ok() {
        SubmitStatus::Accepted
    } else {
        SubmitStatus::Rejected(response.summary())
    }
}
