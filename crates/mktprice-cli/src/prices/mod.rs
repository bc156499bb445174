//! `prices` command handlers.
//!
//! Both commands end the same way: the reconciliation is written to the
//! audit CSV, the planned changes go through the batch dispatcher, and the
//! counters are printed.

pub(crate) mod from_csv;
pub(crate) mod update;

use clap::Subcommand;
use mktprice_core::{dispatch_batches, BatchResult, DispatchOptions, Reconciliation};
use mktprice_market::{DataIssue, PriceBatchSink};

use crate::context::RunContext;
use crate::report;

pub(crate) use from_csv::FromCsvArgs;
pub(crate) use update::UpdateArgs;

/// Sub-commands available under `prices`.
#[derive(Debug, Subcommand)]
pub(crate) enum PricesCommands {
    /// Apply a pricing strategy to the filtered catalog
    Update(UpdateArgs),
    /// Set prices listed in a CSV file
    FromCsv(FromCsvArgs),
}

/// Logs every offer left out of the snapshot.
pub(crate) fn log_data_issues(issues: &[DataIssue]) {
    for issue in issues {
        tracing::warn!(
            offer_id = %issue.offer_id,
            name = %issue.name,
            reason = %issue.reason,
            "offer excluded from snapshot"
        );
    }
    if !issues.is_empty() {
        tracing::warn!(count = issues.len(), "offers with data issues were skipped");
    }
}

/// Writes the audit and submits the planned changes.
///
/// The returned counters do not include skipped offers; callers add them
/// with [`BatchResult::with_skipped`].
async fn submit_reconciliation(
    ctx: &RunContext,
    business_id: u64,
    reconciliation: &Reconciliation,
    dispatch: &DispatchOptions,
) -> anyhow::Result<BatchResult> {
    let audit_path = report::timestamped_path(&ctx.config.log_dir, "price_changes");
    report::write_price_audit(&audit_path, &reconciliation.audit)?;

    if reconciliation.planned.is_empty() {
        tracing::info!("no price changes to submit");
        return Ok(BatchResult::default());
    }

    let sink = PriceBatchSink::new(&ctx.client, business_id);
    Ok(dispatch_batches(&sink, &reconciliation.planned, dispatch, &ctx.cancel).await)
}

#[cfg(test)]
#[path = "prices_test.rs"]
mod tests;
