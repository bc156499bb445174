use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Currency assumed when the marketplace omits one.
pub const DEFAULT_CURRENCY: &str = "RUR";

/// Marketplace availability status of an offer.
///
/// Unrecognised values are preserved in [`OfferStatus::Unknown`] so they can
/// still be written to reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OfferStatus {
    Published,
    Checking,
    Disabled,
    NoStocks,
    Unknown(String),
}

impl OfferStatus {
    #[must_use]
    pub fn from_raw(raw: &str) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "PUBLISHED" | "READY" => OfferStatus::Published,
            "CHECKING" | "IN_WORK" => OfferStatus::Checking,
            "DISABLED_BY_PARTNER" | "DISABLED_AUTOMATICALLY" | "DISABLED" => {
                OfferStatus::Disabled
            }
            "NO_STOCKS" => OfferStatus::NoStocks,
            _ => OfferStatus::Unknown(raw.to_owned()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            OfferStatus::Published => "PUBLISHED",
            OfferStatus::Checking => "CHECKING",
            OfferStatus::Disabled => "DISABLED",
            OfferStatus::NoStocks => "NO_STOCKS",
            OfferStatus::Unknown(raw) => raw,
        }
    }
}

impl std::fmt::Display for OfferStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single product listing as seen at the start of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    /// Merchant SKU (`offerId`), unique within the business catalog.
    pub id: String,
    pub name: String,
    /// Marketplace category name, when the offer has been mapped.
    pub category: Option<String>,
    pub price: Decimal,
    /// ISO-like currency code as the marketplace reports it (e.g. `"RUR"`).
    pub currency: String,
    pub status: OfferStatus,
}

impl Offer {
    /// Category for display and matching; empty when unmapped.
    #[must_use]
    pub fn category_or_empty(&self) -> &str {
        self.category.as_deref().unwrap_or("")
    }
}
