//! Warehouse stock planning.

use std::str::FromStr;

use serde::Serialize;

/// Stock category a change applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StockType {
    /// Sellable units.
    #[default]
    Fit,
    Defect,
}

impl StockType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StockType::Fit => "FIT",
            StockType::Defect => "DEFECT",
        }
    }
}

impl std::fmt::Display for StockType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StockType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FIT" => Ok(StockType::Fit),
            "DEFECT" => Ok(StockType::Defect),
            _ => Err(format!("unknown stock type: {s} (expected FIT or DEFECT)")),
        }
    }
}

/// One stock line from the warehouse listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockEntry {
    pub offer_id: String,
    pub warehouse_id: u64,
    /// Raw type as reported by the marketplace (`FIT`, `DEFECT`, `AVAILABLE`...).
    pub stock_type: String,
    pub count: u64,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockChange {
    pub offer_id: String,
    pub warehouse_id: u64,
    pub stock_type: StockType,
    pub old_count: u64,
    pub new_count: u64,
}

impl StockChange {
    #[must_use]
    pub fn increase(&self) -> u64 {
        self.new_count - self.old_count
    }
}

/// Plans `count + amount` for every entry of `stock_type`, preserving order.
///
/// A zero `amount` plans nothing.
#[must_use]
pub fn plan_stock_increase(
    entries: &[StockEntry],
    stock_type: StockType,
    amount: u64,
) -> Vec<StockChange> {
    if amount == 0 {
        tracing::info!("stock increase amount is zero; nothing to plan");
        return Vec::new();
    }

    let changes: Vec<StockChange> = entries
        .iter()
        .filter(|entry| entry.stock_type.eq_ignore_ascii_case(stock_type.as_str()))
        .map(|entry| StockChange {
            offer_id: entry.offer_id.clone(),
            warehouse_id: entry.warehouse_id,
            stock_type,
            old_count: entry.count,
            new_count: entry.count.saturating_add(amount),
        })
        .collect();

    tracing::info!(
        entries = entries.len(),
        matching = changes.len(),
        %stock_type,
        amount,
        "planned stock increase"
    );
    changes
}
