//! Diffing target prices against the snapshot.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::offer::Offer;
use crate::pricing::PriceQuote;

/// Price deltas smaller than this are treated as no-ops.
pub const MATERIALITY_THRESHOLD: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

pub const REASON_UNCHANGED: &str = "price unchanged";
pub const REASON_INVALID_TARGET: &str = "invalid target price";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditStatus {
    Planned,
    Skipped,
}

impl AuditStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AuditStatus::Planned => "PLANNED",
            AuditStatus::Skipped => "SKIPPED",
        }
    }
}

impl std::fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the per-run audit report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    pub offer_id: String,
    pub name: String,
    pub status: AuditStatus,
    pub old_price: Decimal,
    pub new_price: Decimal,
    pub change_amount: Decimal,
    /// `None` when the old price is zero.
    pub change_percent: Option<Decimal>,
    pub description: String,
    pub reason: String,
}

/// A single mutation to submit to the marketplace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceChangePlan {
    pub offer_id: String,
    /// Always strictly positive.
    pub price: Decimal,
    pub currency: String,
    pub description: String,
}

#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    /// One entry per considered offer, in input order.
    pub audit: Vec<AuditEntry>,
    pub planned: Vec<PriceChangePlan>,
}

impl Reconciliation {
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.audit
            .iter()
            .filter(|entry| entry.status == AuditStatus::Skipped)
            .count()
    }
}

/// Classifies each `(offer, quote)` pair as planned or skipped.
///
/// Quotes that are not strictly positive are skipped with
/// [`REASON_INVALID_TARGET`]; quotes within [`MATERIALITY_THRESHOLD`] of the
/// current price are skipped with [`REASON_UNCHANGED`].
pub fn reconcile<'a, I>(pairs: I) -> Reconciliation
where
    I: IntoIterator<Item = (&'a Offer, PriceQuote)>,
{
    let mut out = Reconciliation::default();

    for (offer, quote) in pairs {
        let change_amount = quote.price - offer.price;
        let change_percent = change_amount
            .checked_div(offer.price)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .map(|percent| percent.round_dp(2));

        let skip_reason = if !quote.is_valid() {
            tracing::warn!(
                offer_id = %offer.id,
                target = %quote.price,
                "computed price is not positive; skipping offer"
            );
            Some(REASON_INVALID_TARGET)
        } else if change_amount.abs() < MATERIALITY_THRESHOLD {
            Some(REASON_UNCHANGED)
        } else {
            None
        };

        let status = if skip_reason.is_some() {
            AuditStatus::Skipped
        } else {
            out.planned.push(PriceChangePlan {
                offer_id: offer.id.clone(),
                price: quote.price,
                currency: offer.currency.clone(),
                description: quote.description.clone(),
            });
            AuditStatus::Planned
        };

        out.audit.push(AuditEntry {
            offer_id: offer.id.clone(),
            name: offer.name.clone(),
            status,
            old_price: offer.price,
            new_price: quote.price,
            change_amount,
            change_percent,
            description: quote.description,
            reason: skip_reason.unwrap_or_default().to_owned(),
        });
    }

    tracing::info!(
        considered = out.audit.len(),
        planned = out.planned.len(),
        skipped = out.skipped(),
        "reconciled target prices"
    );
    out
}
