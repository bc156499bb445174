//! `offers` command handlers.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Subcommand};
use mktprice_core::offer::DEFAULT_CURRENCY;
use mktprice_core::BatchResult;
use mktprice_market::{build_offer_snapshot, OfferSnapshot, PriceInfo};

use crate::context::{RunContext, RunOutcome};
use crate::report::{self, ExportRow};

/// Sub-commands available under `offers`.
#[derive(Debug, Subcommand)]
pub(crate) enum OffersCommands {
    /// Write the catalog to a CSV file
    Export(ExportArgs),
}

#[derive(Debug, Clone, Args)]
pub(crate) struct ExportArgs {
    /// Output file (default: products_<timestamp>.csv)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Overlay the campaign's current prices
    #[arg(long)]
    pub with_prices: bool,
}

/// One row per catalog entry, offers first, then entries with data issues.
///
/// With `prices`, a campaign price replaces the catalog price and
/// currency, and fills `updated_at`.
pub(crate) fn build_export_rows(
    snapshot: &OfferSnapshot,
    prices: Option<&HashMap<String, PriceInfo>>,
) -> Vec<ExportRow> {
    let price_of = |id: &str| prices.and_then(|p| p.get(id));

    let offers = snapshot.offers.iter().map(|offer| {
        let info = price_of(&offer.id);
        ExportRow {
            offer_id: offer.id.clone(),
            name: offer.name.clone(),
            category: offer.category_or_empty().to_owned(),
            price: info.and_then(|i| i.price).or(Some(offer.price)),
            currency: info
                .and_then(|i| i.currency.clone())
                .unwrap_or_else(|| offer.currency.clone()),
            status: offer.status.as_str().to_owned(),
            updated_at: info.and_then(|i| i.updated_at.clone()),
        }
    });

    let issues = snapshot.issues.iter().map(|issue| {
        let info = price_of(&issue.offer_id);
        ExportRow {
            offer_id: issue.offer_id.clone(),
            name: issue.name.clone(),
            category: String::new(),
            price: info.and_then(|i| i.price),
            currency: info
                .and_then(|i| i.currency.clone())
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_owned()),
            status: issue.reason.clone(),
            updated_at: info.and_then(|i| i.updated_at.clone()),
        }
    });

    offers.chain(issues).collect()
}

pub(crate) async fn run_export(ctx: &RunContext, args: &ExportArgs) -> anyhow::Result<RunOutcome> {
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

    let prices = if args.with_prices && !snapshot.cancelled {
        let ids: Vec<String> = snapshot
            .offers
            .iter()
            .map(|o| o.id.clone())
            .chain(snapshot.issues.iter().map(|i| i.offer_id.clone()))
            .collect();
        Some(
            ctx.client
                .get_prices(ctx.campaign_id, &ids)
                .await
                .context("failed to load campaign prices")?,
        )
    } else {
        None
    };

    let rows = build_export_rows(&snapshot, prices.as_ref());
    let path = args.output.clone().unwrap_or_else(|| {
        let prefix = if args.with_prices {
            "products_with_prices"
        } else {
            "products"
        };
        report::timestamped_path(Path::new("."), prefix)
    });
    let written = report::write_export(&path, &rows)?;

    tracing::info!(
        rows = written,
        issues = snapshot.issues.len(),
        path = %path.display(),
        "exported offers"
    );
    println!("exported {written} offers to {}", path.display());
    if snapshot.cancelled {
        println!("interrupted: the export is incomplete");
    }

    let result = BatchResult {
        success: written,
        ..BatchResult::default()
    };
    Ok(RunOutcome::new(result, snapshot.cancelled))
}
