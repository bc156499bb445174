use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Context as _;
use clap::Args;
use mktprice_core::{reconcile, BatchResult, Offer, PriceQuote};
use mktprice_market::build_offer_snapshot;

use super::{log_data_issues, submit_reconciliation};
use crate::context::{RunContext, RunOutcome};
use crate::csv_input::{read_csv_prices, CsvPrice, CsvPrices};
use crate::report;
use crate::BatchArgs;

pub(crate) const CSV_DESCRIPTION: &str = "price from CSV";

#[derive(Debug, Clone, Args)]
pub(crate) struct FromCsvArgs {
    /// CSV file with one row per SKU
    #[arg(long)]
    pub csv_file: PathBuf,

    /// Header of the SKU column
    #[arg(long, default_value = "sku")]
    pub sku_column: String,

    /// Header of the target price column
    #[arg(long, default_value = "old_price")]
    pub price_column: String,

    #[command(flatten)]
    pub batch: BatchArgs,
}

/// Pairs each CSV row with its snapshot offer.
///
/// Returns the matched pairs in CSV order and the SKUs with no offer.
pub(crate) fn match_rows<'a>(
    rows: &[CsvPrice],
    offers: &'a [Offer],
) -> (Vec<(&'a Offer, PriceQuote)>, Vec<String>) {
    let by_id: HashMap<&str, &Offer> = offers.iter().map(|o| (o.id.as_str(), o)).collect();
    let mut matched = Vec::with_capacity(rows.len());
    let mut not_found = Vec::new();

    for row in rows {
        match by_id.get(row.sku.as_str()) {
            Some(offer) => matched.push((
                *offer,
                PriceQuote {
                    price: row.price.round_dp(2),
                    description: CSV_DESCRIPTION.to_owned(),
                },
            )),
            None => {
                tracing::warn!(sku = %row.sku, "SKU not found in catalog");
                not_found.push(row.sku.clone());
            }
        }
    }
    (matched, not_found)
}

/// Summary counters for CSV rows that never reach the reconciler.
///
/// They are reported apart from `skipped`, which counts audit entries only.
pub(crate) fn row_counters(csv: &CsvPrices, not_found: usize) -> [(&'static str, usize); 3] {
    [
        ("not_found", not_found),
        ("invalid_rows", csv.invalid),
        ("blank_rows", csv.blank),
    ]
}

/// Runs `prices from-csv`.
///
/// The CSV is read before any request is made, so a bad file fails fast.
pub(crate) async fn run_from_csv(
    ctx: &RunContext,
    args: &FromCsvArgs,
    quiet: bool,
) -> anyhow::Result<RunOutcome> {
    let csv = read_csv_prices(&args.csv_file, &args.sku_column, &args.price_column)?;
    let dispatch = args.batch.dispatch_options(&ctx.config);
    tracing::info!(
        file = %args.csv_file.display(),
        rows = csv.rows.len(),
        dry_run = dispatch.dry_run,
        "starting CSV price update"
    );

    let business_id = ctx.business_id().await?;
    let snapshot = build_offer_snapshot(
        &ctx.client,
        business_id,
        ctx.campaign_id,
        &ctx.snapshot_options(None),
        &ctx.cancel,
    )
    .await
    .context("failed to load offers")?;
    log_data_issues(&snapshot.issues);

    if snapshot.cancelled {
        tracing::warn!("interrupted while loading offers; nothing submitted");
        return Ok(RunOutcome::new(BatchResult::default(), true));
    }

    let (matched, not_found) = match_rows(&csv.rows, &snapshot.offers);
    let reconciliation = reconcile(matched);

    let result = submit_reconciliation(ctx, business_id, &reconciliation, &dispatch)
        .await?
        .with_skipped(reconciliation.skipped());

    report::print_summary(
        "CSV PRICE UPDATE",
        &result,
        &row_counters(&csv, not_found.len()),
        dispatch.dry_run,
        quiet,
    );
    Ok(RunOutcome::new(result, false))
}
