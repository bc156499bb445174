//! Target prices read from a merchant-supplied CSV file.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CsvInputError {
    #[error("failed to read CSV {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("column '{0}' not found in CSV header")]
    MissingColumn(String),
}

/// One usable row: a SKU and a strictly positive target price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvPrice {
    pub sku: String,
    pub price: Decimal,
}

#[derive(Debug, Default)]
pub struct CsvPrices {
    /// Unique SKUs in first-seen order; a repeated SKU keeps its last price.
    pub rows: Vec<CsvPrice>,
    /// Rows with an unparsable or non-positive price.
    pub invalid: usize,
    /// Rows with an empty SKU or empty price cell.
    pub blank: usize,
}

/// Reads `sku_column`/`price_column` from the CSV at `path`.
///
/// # Errors
///
/// Returns [`CsvInputError::Read`] if the file cannot be opened or parsed,
/// and [`CsvInputError::MissingColumn`] if either column is absent.
pub fn read_csv_prices(
    path: &Path,
    sku_column: &str,
    price_column: &str,
) -> Result<CsvPrices, CsvInputError> {
    let wrap = |source: csv::Error| CsvInputError::Read {
        path: path.display().to_string(),
        source,
    };
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(wrap)?;
    parse_csv_prices(reader, sku_column, price_column).map_err(|e| match e {
        CsvInputError::Read { source, .. } => wrap(source),
        other => other,
    })
}

fn parse_csv_prices<R: Read>(
    mut reader: csv::Reader<R>,
    sku_column: &str,
    price_column: &str,
) -> Result<CsvPrices, CsvInputError> {
    let read_err = |source| CsvInputError::Read {
        path: String::new(),
        source,
    };
    let headers = reader.headers().map_err(read_err)?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| CsvInputError::MissingColumn(name.to_owned()))
    };
    let sku_idx = column(sku_column)?;
    let price_idx = column(price_column)?;

    let mut out = CsvPrices::default();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(read_err)?;
        // Header is line 1.
        let line = index + 2;
        let sku = record.get(sku_idx).unwrap_or_default();
        let raw_price = record.get(price_idx).unwrap_or_default();
        if sku.is_empty() || raw_price.is_empty() {
            out.blank += 1;
            continue;
        }

        let price = match raw_price.replace(',', ".").parse::<Decimal>() {
            Ok(p) if p > Decimal::ZERO => p,
            _ => {
                tracing::warn!(line, sku, price = raw_price, "invalid price in CSV; row skipped");
                out.invalid += 1;
                continue;
            }
        };

        if let Some(&pos) = positions.get(sku) {
            out.rows[pos].price = price;
        } else {
            positions.insert(sku.to_owned(), out.rows.len());
            out.rows.push(CsvPrice {
                sku: sku.to_owned(),
                price,
            });
        }
    }

    tracing::info!(
        rows = out.rows.len(),
        invalid = out.invalid,
        blank = out.blank,
        "loaded prices from CSV"
    );
    Ok(out)
}
