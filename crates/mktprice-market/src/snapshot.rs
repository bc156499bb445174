//! Paged reads that build the in-memory view of a catalog.
//!
//! Both builders walk the cursor until the marketplace stops returning one,
//! pausing between pages. A cancelled token ends the walk early; what was
//! read so far is returned with `cancelled` set.

use std::time::Duration;

use mktprice_core::dispatch::pause;
use mktprice_core::offer::DEFAULT_CURRENCY;
use mktprice_core::{Offer, OfferStatus, StockEntry};
use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;

use crate::client::MarketClient;
use crate::error::MarketError;
use crate::types::{parse_price_value, OfferMappingEntry};

/// Upper bound on pages per listing, guarding against cycling cursors.
pub const MAX_PAGES: usize = 1000;

#[derive(Debug, Clone)]
pub struct SnapshotOptions {
    pub page_size: u32,
    pub page_delay: Duration,
    /// Stop after this many catalog entries.
    pub limit: Option<usize>,
}

impl Default for SnapshotOptions {
    fn default() -> Self {
        Self {
            page_size: 200,
            page_delay: Duration::from_millis(500),
            limit: None,
        }
    }
}

/// An offer left out of the snapshot, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataIssue {
    pub offer_id: String,
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct OfferSnapshot {
    /// Offers with a usable positive price, in catalog order.
    pub offers: Vec<Offer>,
    pub issues: Vec<DataIssue>,
    pub cancelled: bool,
}

#[derive(Debug, Default)]
pub struct StockSnapshot {
    pub entries: Vec<StockEntry>,
    pub cancelled: bool,
}

/// Pages through the business catalog and converts each entry to an
/// [`Offer`]. Entries without a usable price become [`DataIssue`]s.
///
/// `campaign_id` selects which per-campaign status is reported.
///
/// # Errors
///
/// Propagates the first failing page, or [`MarketError::PaginationLimit`]
/// past [`MAX_PAGES`].
pub async fn build_offer_snapshot(
    client: &MarketClient,
    business_id: u64,
    campaign_id: u64,
    opts: &SnapshotOptions,
    cancel: &CancellationToken,
) -> Result<OfferSnapshot, MarketError> {
    let mut snapshot = OfferSnapshot::default();
    let mut cursor: Option<String> = None;
    let mut fetched = 0usize;
    let mut page_count = 0usize;

    loop {
        page_count += 1;
        if page_count > MAX_PAGES {
            return Err(MarketError::PaginationLimit {
                endpoint: format!("businesses/{business_id}/offer-mappings"),
                max_pages: MAX_PAGES,
            });
        }

        if page_count > 1 && !pause(opts.page_delay, cancel).await {
            snapshot.cancelled = true;
            break;
        }

        let page_size = match opts.limit {
            Some(limit) => remaining_page_size(opts.page_size, limit - fetched),
            None => opts.page_size,
        };
        let page = client
            .list_offers(business_id, cursor.as_deref(), page_size)
            .await?;
        tracing::debug!(page = page_count, items = page.items.len(), "fetched offer page");

        for entry in page.items {
            if opts.limit.is_some_and(|limit| fetched >= limit) {
                break;
            }
            fetched += 1;
            match convert_entry(entry, campaign_id) {
                Ok(offer) => snapshot.offers.push(offer),
                Err(issue) => {
                    tracing::warn!(
                        offer_id = %issue.offer_id,
                        reason = %issue.reason,
                        "offer excluded from snapshot"
                    );
                    snapshot.issues.push(issue);
                }
            }
        }

        if opts.limit.is_some_and(|limit| fetched >= limit) {
            break;
        }
        cursor = page.next_page_token;
        if cursor.is_none() {
            break;
        }
    }

    tracing::info!(
        pages = page_count,
        offers = snapshot.offers.len(),
        issues = snapshot.issues.len(),
        cancelled = snapshot.cancelled,
        "built offer snapshot"
    );
    Ok(snapshot)
}

/// Pages through warehouse stocks, one [`StockEntry`] per stock line.
///
/// # Errors
///
/// Propagates the first failing page, or [`MarketError::PaginationLimit`]
/// past [`MAX_PAGES`].
pub async fn collect_stocks(
    client: &MarketClient,
    campaign_id: u64,
    opts: &SnapshotOptions,
    cancel: &CancellationToken,
) -> Result<StockSnapshot, MarketError> {
    let mut snapshot = StockSnapshot::default();
    let mut cursor: Option<String> = None;
    let mut page_count = 0usize;

    loop {
        page_count += 1;
        if page_count > MAX_PAGES {
            return Err(MarketError::PaginationLimit {
                endpoint: format!("campaigns/{campaign_id}/offers/stocks"),
                max_pages: MAX_PAGES,
            });
        }

        if page_count > 1 && !pause(opts.page_delay, cancel).await {
            snapshot.cancelled = true;
            break;
        }

        let page = client
            .list_stocks(campaign_id, cursor.as_deref(), opts.page_size)
            .await?;

        for warehouse in page.warehouses {
            for offer in warehouse.offers {
                for stock in offer.stocks {
                    snapshot.entries.push(StockEntry {
                        offer_id: offer.offer_id.clone(),
                        warehouse_id: warehouse.warehouse_id,
                        stock_type: stock.stock_type,
                        count: stock.count,
                        updated_at: offer.updated_at.clone(),
                    });
                }
            }
        }

        cursor = page.next_page_token;
        if cursor.is_none() {
            break;
        }
    }

    tracing::info!(
        pages = page_count,
        entries = snapshot.entries.len(),
        cancelled = snapshot.cancelled,
        "collected warehouse stocks"
    );
    Ok(snapshot)
}

fn remaining_page_size(page_size: u32, remaining: usize) -> u32 {
    u32::try_from(remaining).map_or(page_size, |r| page_size.min(r.max(1)))
}

fn convert_entry(entry: OfferMappingEntry, campaign_id: u64) -> Result<Offer, DataIssue> {
    let offer = entry.offer;
    let name = offer.name.unwrap_or_default();

    let issue = |reason: &str| DataIssue {
        offer_id: offer.offer_id.clone(),
        name: name.clone(),
        reason: reason.to_owned(),
    };

    let Some(raw_price) = offer.basic_price.as_ref() else {
        return Err(issue("missing price"));
    };
    let Some(raw_value) = raw_price.value.as_ref() else {
        return Err(issue("missing price"));
    };
    let Some(price) = parse_price_value(raw_value) else {
        return Err(issue("malformed price"));
    };
    if price <= Decimal::ZERO {
        return Err(issue("non-positive price"));
    }

    let currency = raw_price
        .currency_id
        .clone()
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_owned());
    let status = offer
        .campaigns
        .iter()
        .find(|c| c.campaign_id == campaign_id)
        .and_then(|c| c.status.as_deref())
        .map_or_else(
            || OfferStatus::Unknown("UNKNOWN".to_owned()),
            OfferStatus::from_raw,
        );
    let category = entry
        .mapping
        .and_then(|m| m.market_category_name)
        .filter(|c| !c.is_empty());

    Ok(Offer {
        id: offer.offer_id,
        name,
        category,
        price,
        currency,
        status,
    })
}
