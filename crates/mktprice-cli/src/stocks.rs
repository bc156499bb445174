//! `stocks` command handlers.

use anyhow::Context as _;
use clap::{Args, Subcommand};
use mktprice_core::{dispatch_batches, plan_stock_increase, BatchResult, StockType};
use mktprice_market::{collect_stocks, StockBatchSink};

use crate::context::{RunContext, RunOutcome};
use crate::report;
use crate::BatchArgs;

/// Sub-commands available under `stocks`.
#[derive(Debug, Subcommand)]
pub(crate) enum StocksCommands {
    /// Add a fixed amount to every warehouse stock entry of one type
    Increase(IncreaseArgs),
}

#[derive(Debug, Clone, Args)]
pub(crate) struct IncreaseArgs {
    /// Units to add to each entry
    #[arg(long, default_value_t = 1)]
    pub amount: u64,

    /// FIT or DEFECT
    #[arg(long, default_value_t = StockType::Fit)]
    pub stock_type: StockType,

    #[command(flatten)]
    pub batch: BatchArgs,
}

pub(crate) async fn run_increase(
    ctx: &RunContext,
    args: &IncreaseArgs,
    quiet: bool,
) -> anyhow::Result<RunOutcome> {
    let dispatch = args.batch.dispatch_options(&ctx.config);
    tracing::info!(
        amount = args.amount,
        stock_type = %args.stock_type,
        dry_run = dispatch.dry_run,
        "starting stock increase"
    );

    let snapshot = collect_stocks(
        &ctx.client,
        ctx.campaign_id,
        &ctx.snapshot_options(None),
        &ctx.cancel,
    )
    .await
    .context("failed to load stocks")?;

    if snapshot.cancelled {
        tracing::warn!(
            loaded = snapshot.entries.len(),
            "interrupted while loading stocks; nothing submitted"
        );
        return Ok(RunOutcome::new(BatchResult::default(), true));
    }

    let changes = plan_stock_increase(&snapshot.entries, args.stock_type, args.amount);
    tracing::info!(
        entries = snapshot.entries.len(),
        planned = changes.len(),
        "planned stock changes"
    );

    let audit_path = report::timestamped_path(&ctx.config.log_dir, "stock_changes");
    report::write_stock_audit(&audit_path, &changes)?;

    let result = if changes.is_empty() {
        BatchResult::default()
    } else {
        let sink = StockBatchSink::new(&ctx.client, ctx.campaign_id);
        dispatch_batches(&sink, &changes, &dispatch, &ctx.cancel).await
    };

    report::print_summary("STOCK UPDATE", &result, &[], dispatch.dry_run, quiet);
    Ok(RunOutcome::new(result, false))
}
