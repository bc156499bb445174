//! CSV reports and the end-of-run summary.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use mktprice_core::{AuditEntry, BatchResult, StockChange};
use rust_decimal::Decimal;
use serde::Serialize;

/// `<dir>/<prefix>_<YYYYmmdd_HHMMSS>.csv`, stamped with local time.
pub(crate) fn timestamped_path(dir: &Path, prefix: &str) -> PathBuf {
    dir.join(format!(
        "{prefix}_{}.csv",
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    ))
}

#[derive(Debug, Serialize)]
struct AuditRow<'a> {
    identifier: &'a str,
    name: &'a str,
    status: &'static str,
    old_price: Decimal,
    new_price: Decimal,
    change_amount: Decimal,
    change_percent: Option<Decimal>,
    description: &'a str,
    reason: &'a str,
}

impl<'a> From<&'a AuditEntry> for AuditRow<'a> {
    fn from(entry: &'a AuditEntry) -> Self {
        Self {
            identifier: &entry.offer_id,
            name: &entry.name,
            status: entry.status.as_str(),
            old_price: entry.old_price,
            new_price: entry.new_price,
            change_amount: entry.change_amount,
            change_percent: entry.change_percent,
            description: &entry.description,
            reason: &entry.reason,
        }
    }
}

#[derive(Debug, Serialize)]
struct StockRow<'a> {
    offer_id: &'a str,
    warehouse_id: u64,
    #[serde(rename = "type")]
    stock_type: &'static str,
    old_count: u64,
    new_count: u64,
    increase: u64,
}

/// One row of the catalog export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct ExportRow {
    pub offer_id: String,
    pub name: String,
    pub category: String,
    pub price: Option<Decimal>,
    pub currency: String,
    pub status: String,
    pub updated_at: Option<String>,
}

fn write_rows<T, I>(path: &Path, rows: I) -> anyhow::Result<usize>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let mut written = 0;
    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("failed to write {}", path.display()))?;
        written += 1;
    }
    writer
        .flush()
        .with_context(|| format!("failed to flush {}", path.display()))?;
    Ok(written)
}

/// Writes the per-offer price audit. Nothing is written for an empty audit.
pub(crate) fn write_price_audit(path: &Path, audit: &[AuditEntry]) -> anyhow::Result<()> {
    if audit.is_empty() {
        return Ok(());
    }
    let rows = write_rows(path, audit.iter().map(AuditRow::from))?;
    tracing::info!(rows, path = %path.display(), "wrote price audit");
    Ok(())
}

pub(crate) fn write_stock_audit(path: &Path, changes: &[StockChange]) -> anyhow::Result<()> {
    if changes.is_empty() {
        return Ok(());
    }
    let rows = write_rows(
        path,
        changes.iter().map(|c| StockRow {
            offer_id: &c.offer_id,
            warehouse_id: c.warehouse_id,
            stock_type: c.stock_type.as_str(),
            old_count: c.old_count,
            new_count: c.new_count,
            increase: c.increase(),
        }),
    )?;
    tracing::info!(rows, path = %path.display(), "wrote stock audit");
    Ok(())
}

pub(crate) fn write_export(path: &Path, rows: &[ExportRow]) -> anyhow::Result<usize> {
    write_rows(path, rows)
}

/// Prints the final counters to stdout.
///
/// `extra` carries command-specific counters such as `not_found`.
pub(crate) fn print_summary(
    title: &str,
    result: &BatchResult,
    extra: &[(&str, usize)],
    dry_run: bool,
    quiet: bool,
) {
    if quiet {
        println!("{},{},{}", result.success, result.errors, result.skipped);
        return;
    }
    print!("{}", render_summary(title, result, extra, dry_run));
}

fn render_summary(
    title: &str,
    result: &BatchResult,
    extra: &[(&str, usize)],
    dry_run: bool,
) -> String {
    use std::fmt::Write as _;

    let rule = "=".repeat(50);
    let mut out = String::new();
    let _ = writeln!(out, "{rule}\n{title}\n{rule}");
    let mut line = |label: &str, value: usize| {
        let _ = writeln!(out, "{label:<12}{value:>10}");
    };
    line("success", result.success);
    line("errors", result.errors);
    line("skipped", result.skipped);
    if result.cancelled > 0 {
        line("cancelled", result.cancelled);
    }
    for (label, value) in extra {
        line(label, *value);
    }
    let _ = writeln!(out, "{rule}");
    if dry_run {
        let _ = writeln!(out, "dry run: nothing was submitted");
    } else if result.errors > 0 {
        let _ = writeln!(out, "some batches failed; see the run log");
    } else if result.was_cancelled() {
        let _ = writeln!(out, "interrupted; remaining batches were not sent");
    }
    out
}
