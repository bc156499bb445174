//! Partner API request and response schemas.
//!
//! ### Envelope
//! List endpoints wrap their payload as `{"status": "OK", "result": {...}}`.
//! Mutations answer with the envelope only; anything but `"OK"` means the
//! whole batch was refused.
//!
//! ### Prices
//! `value` arrives as a JSON number, occasionally as a numeric string. It is
//! kept as a raw [`serde_json::Value`] here so one malformed offer does not
//! fail the page; [`parse_price_value`] does the conversion per offer.
//!
//! ### Paging
//! `result.paging.nextPageToken` is absent (or empty) on the last page.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub status: Option<String>,
    pub result: Option<T>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paging {
    #[serde(default)]
    pub next_page_token: Option<String>,
}

impl Paging {
    /// Next cursor, treating an empty token as the end of the listing.
    #[must_use]
    pub fn next(&self) -> Option<&str> {
        self.next_page_token.as_deref().filter(|t| !t.is_empty())
    }
}

/// Answer to any mutation endpoint.
#[derive(Debug, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    #[serde(default)]
    pub errors: Vec<ApiErrorItem>,
}

impl StatusResponse {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == "OK"
    }

    /// Status plus any error messages, for logs.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.errors.is_empty() {
            return self.status.clone();
        }
        let messages: Vec<&str> = self.errors.iter().map(|e| e.message.as_str()).collect();
        format!("{}: {}", self.status, messages.join("; "))
    }
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorItem {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: String,
}

// ---------------------------------------------------------------------------
// Campaigns
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CampaignResponse {
    pub campaign: Campaign,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Campaign {
    pub id: u64,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub business: Option<Business>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Business {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
}

// ---------------------------------------------------------------------------
// Offer mappings
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferMappingsResult {
    #[serde(default)]
    pub offer_mappings: Vec<OfferMappingEntry>,
    #[serde(default)]
    pub paging: Paging,
}

#[derive(Debug, Deserialize)]
pub struct OfferMappingEntry {
    pub offer: RawOffer,
    #[serde(default)]
    pub mapping: Option<Mapping>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOffer {
    pub offer_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub basic_price: Option<RawPrice>,
    #[serde(default)]
    pub campaigns: Vec<OfferCampaignStatus>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mapping {
    #[serde(default)]
    pub market_category_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferCampaignStatus {
    pub campaign_id: u64,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPrice {
    #[serde(default)]
    pub value: Option<serde_json::Value>,
    #[serde(default)]
    pub currency_id: Option<String>,
}

/// One page of the business catalog.
#[derive(Debug)]
pub struct OfferPage {
    pub items: Vec<OfferMappingEntry>,
    pub next_page_token: Option<String>,
}

// ---------------------------------------------------------------------------
// Campaign prices
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OfferPricesRequest<'a> {
    pub offer_ids: &'a [String],
}

#[derive(Debug, Default, Deserialize)]
pub struct OfferPricesResult {
    #[serde(default)]
    pub offers: Vec<RawOfferPrice>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOfferPrice {
    pub offer_id: String,
    #[serde(default)]
    pub price: Option<RawPrice>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Campaign-level price of one offer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceInfo {
    pub price: Option<Decimal>,
    pub currency: Option<String>,
    pub updated_at: Option<String>,
}

// ---------------------------------------------------------------------------
// Price updates
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(crate) struct PriceUpdateRequest<'a> {
    pub offers: Vec<PriceUpdateItem<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PriceUpdateItem<'a> {
    pub offer_id: &'a str,
    pub price: PriceValue<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PriceValue<'a> {
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
    pub currency_id: &'a str,
}

// ---------------------------------------------------------------------------
// Stocks
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(crate) struct StocksRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_token: Option<&'a str>,
    pub limit: u32,
}

#[derive(Debug, Default, Deserialize)]
pub struct StocksResult {
    #[serde(default)]
    pub paging: Paging,
    #[serde(default)]
    pub warehouses: Vec<WarehouseStocks>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseStocks {
    pub warehouse_id: u64,
    #[serde(default)]
    pub offers: Vec<WarehouseOffer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseOffer {
    pub offer_id: String,
    #[serde(default)]
    pub stocks: Vec<StockCount>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StockCount {
    #[serde(rename = "type")]
    pub stock_type: String,
    #[serde(default)]
    pub count: u64,
}

#[derive(Debug)]
pub struct StockPage {
    pub warehouses: Vec<WarehouseStocks>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct StockUpdateRequest<'a> {
    pub skus: Vec<StockUpdateSku<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StockUpdateSku<'a> {
    pub sku: &'a str,
    pub warehouse_id: u64,
    pub items: [StockUpdateItem<'a>; 1],
}

#[derive(Debug, Serialize)]
pub(crate) struct StockUpdateItem<'a> {
    pub count: u64,
    #[serde(rename = "type")]
    pub stock_type: &'a str,
}

/// Converts a raw price `value` to a decimal.
///
/// Accepts JSON numbers and numeric strings; anything else is `None`.
#[must_use]
pub fn parse_price_value(value: &serde_json::Value) -> Option<Decimal> {
    match value {
        serde_json::Value::Number(n) => n.to_string().parse().ok(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use serde_json::json;

    use super::*;

    #[test]
    fn parse_price_value_accepts_numbers_and_strings() {
        assert_eq!(parse_price_value(&json!(1100.5)), Some(dec!(1100.5)));
        assert_eq!(parse_price_value(&json!(999)), Some(dec!(999)));
        assert_eq!(parse_price_value(&json!(" 49.90 ")), Some(dec!(49.90)));
    }

    #[test]
    fn parse_price_value_rejects_garbage() {
        assert_eq!(parse_price_value(&json!("n/a")), None);
        assert_eq!(parse_price_value(&json!(null)), None);
        assert_eq!(parse_price_value(&json!({"value": 1})), None);
    }

    #[test]
    fn empty_next_page_token_ends_listing() {
        let paging: Paging = serde_json::from_value(json!({"nextPageToken": ""})).unwrap();
        assert_eq!(paging.next(), None);
        let paging: Paging = serde_json::from_value(json!({"nextPageToken": "abc"})).unwrap();
        assert_eq!(paging.next(), Some("abc"));
    }

    #[test]
    fn price_update_serializes_value_as_number() {
        let request = PriceUpdateRequest {
            offers: vec![PriceUpdateItem {
                offer_id: "SKU-1",
                price: PriceValue {
                    value: dec!(1290.00),
                    currency_id: "RUR",
                },
            }],
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(
            body,
            json!({"offers": [{"offerId": "SKU-1", "price": {"value": 1290.0, "currencyId": "RUR"}}]})
        );
    }

    #[test]
    fn stock_update_uses_marketplace_field_names() {
        let request = StockUpdateRequest {
            skus: vec![StockUpdateSku {
                sku: "SKU-1",
                warehouse_id: 7,
                items: [StockUpdateItem {
                    count: 6,
                    stock_type: "FIT",
                }],
            }],
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(
            body,
            json!({"skus": [{"sku": "SKU-1", "warehouseId": 7, "items": [{"count": 6, "type": "FIT"}]}]})
        );
    }

    #[test]
    fn status_summary_includes_messages() {
        let response: StatusResponse = serde_json::from_value(json!({
            "status": "ERROR",
            "errors": [{"code": "BAD_REQUEST", "message": "price too low"}]
        }))
        .unwrap();
        assert!(!response.is_ok());
        assert_eq!(response.summary(), "ERROR: price too low");
    }
}
