use std::collections::HashSet;

use anyhow::Context as _;
use clap::Args;
use mktprice_core::{
    apply_filters, compute_price, reconcile, validate_bounds, BatchResult, FilterSet, PriceBounds,
    PriceStrategy,
};
use mktprice_market::build_offer_snapshot;
use rust_decimal::Decimal;

use super::{log_data_issues, submit_reconciliation};
use crate::context::{RunContext, RunOutcome};
use crate::report;
use crate::BatchArgs;

#[derive(Debug, Clone, Args)]
pub(crate) struct UpdateArgs {
    /// percentage, fixed-amount, round-up, competitive or custom-round
    #[arg(long)]
    pub strategy: PriceStrategy,

    /// Percent for most strategies; an absolute amount for fixed-amount
    #[arg(long, allow_negative_numbers = true)]
    pub value: Decimal,

    /// Only offers currently priced at or above this
    #[arg(long)]
    pub min_price: Option<Decimal>,

    /// Only offers currently priced at or below this
    #[arg(long)]
    pub max_price: Option<Decimal>,

    /// Case-insensitive substring of the category name
    #[arg(long)]
    pub category: Option<String>,

    /// Case-insensitive substring of the offer name
    #[arg(long)]
    pub name_filter: Option<String>,

    /// SKUs to leave untouched (comma-separated or repeated)
    #[arg(long, value_delimiter = ',', num_args = 1..)]
    pub exclude_skus: Vec<String>,

    /// Floor for computed prices
    #[arg(long)]
    pub min_new_price: Option<Decimal>,

    /// Ceiling for computed prices
    #[arg(long)]
    pub max_new_price: Option<Decimal>,

    /// Stop reading the catalog after this many offers
    #[arg(long)]
    pub limit: Option<usize>,

    #[command(flatten)]
    pub batch: BatchArgs,
}

impl UpdateArgs {
    pub(crate) fn filter_set(&self) -> FilterSet {
        FilterSet {
            min_current_price: self.min_price,
            max_current_price: self.max_price,
            category: self.category.clone(),
            name: self.name_filter.clone(),
            exclude_ids: self
                .exclude_skus
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect::<HashSet<_>>(),
        }
    }

    pub(crate) fn bounds(&self) -> PriceBounds {
        PriceBounds {
            min: self.min_new_price,
            max: self.max_new_price,
        }
    }
}

/// Runs `prices update`.
///
/// Filters and bounds are validated before any request is made.
pub(crate) async fn run_update(
    ctx: &RunContext,
    args: &UpdateArgs,
    quiet: bool,
) -> anyhow::Result<RunOutcome> {
    let filters = args.filter_set();
    filters.validate()?;
    let bounds = args.bounds();
    validate_bounds(&bounds)?;
    let dispatch = args.batch.dispatch_options(&ctx.config);

    tracing::info!(
        strategy = %args.strategy,
        value = %args.value,
        dry_run = dispatch.dry_run,
        active_filters = filters.active_count(),
        "starting price update"
    );

    let business_id = ctx.business_id().await?;
    let snapshot = build_offer_snapshot(
        &ctx.client,
        business_id,
        ctx.campaign_id,
        &ctx.snapshot_options(args.limit),
        &ctx.cancel,
    )
    .await
    .context("failed to load offers")?;
    log_data_issues(&snapshot.issues);

    if snapshot.cancelled {
        tracing::warn!(
            loaded = snapshot.offers.len(),
            "interrupted while loading offers; nothing submitted"
        );
        return Ok(RunOutcome::new(BatchResult::default(), true));
    }

    let selected = apply_filters(&snapshot.offers, &filters);
    tracing::info!(
        loaded = snapshot.offers.len(),
        selected = selected.len(),
        "offers selected for update"
    );

    let reconciliation = reconcile(
        selected
            .iter()
            .map(|offer| (offer, compute_price(offer.price, args.strategy, args.value, bounds))),
    );

    let result = submit_reconciliation(ctx, business_id, &reconciliation, &dispatch)
        .await?
        .with_skipped(reconciliation.skipped());

    report::print_summary("PRICE UPDATE", &result, &[], dispatch.dry_run, quiet);
    Ok(RunOutcome::new(result, false))
}
