//! Batched submission with partial-failure accounting.
//!
//! [`dispatch_batches`] walks planned changes in fixed-size chunks and hands
//! each chunk to a [`BatchSubmitter`]. A failed chunk is counted and the loop
//! moves on; nothing is rolled back and nothing inside a failed chunk is
//! retried individually.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Marketplace verdict for a whole batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitStatus {
    Accepted,
    /// The request went through but the marketplace refused the batch.
    Rejected(String),
}

/// Sends one batch of changes somewhere.
pub trait BatchSubmitter<T> {
    type Error: std::fmt::Display;

    fn submit(&self, batch: &[T]) -> impl Future<Output = Result<SubmitStatus, Self::Error>>;
}

#[derive(Debug, Clone)]
pub struct DispatchOptions {
    pub batch_size: usize,
    /// Pause between consecutive batches; never applied after the last one.
    pub delay: Duration,
    pub dry_run: bool,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            batch_size: 50,
            delay: Duration::from_secs(1),
            dry_run: false,
        }
    }
}

/// Run counters.
///
/// After [`BatchResult::with_skipped`], `success + errors + skipped + cancelled`
/// equals the number of offers considered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchResult {
    pub success: usize,
    pub errors: usize,
    pub skipped: usize,
    /// Items in batches never sent because the run was stopped.
    pub cancelled: usize,
}

impl BatchResult {
    #[must_use]
    pub fn with_skipped(mut self, skipped: usize) -> Self {
        self.skipped = skipped;
        self
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.success + self.errors + self.skipped + self.cancelled
    }

    #[must_use]
    pub fn was_cancelled(&self) -> bool {
        self.cancelled > 0
    }
}

/// Submits `items` in batches of `opts.batch_size`.
///
/// In dry-run mode the submitter is never called and every item counts as a
/// success. When `cancel` fires, the current pause ends early and every item
/// not yet submitted is counted as cancelled.
pub async fn dispatch_batches<T, S>(
    submitter: &S,
    items: &[T],
    opts: &DispatchOptions,
    cancel: &CancellationToken,
) -> BatchResult
where
    S: BatchSubmitter<T>,
{
    let mut result = BatchResult::default();

    if opts.dry_run {
        tracing::info!(planned = items.len(), "dry run: nothing submitted");
        result.success = items.len();
        return result;
    }

    let batch_size = opts.batch_size.max(1);
    let total_batches = items.len().div_ceil(batch_size);
    let mut sent = 0usize;

    for (index, batch) in items.chunks(batch_size).enumerate() {
        let batch_no = index + 1;

        if index > 0 && !pause(opts.delay, cancel).await {
            break;
        }
        if cancel.is_cancelled() {
            break;
        }

        tracing::info!(batch = batch_no, total_batches, size = batch.len(), "submitting batch");
        match submitter.submit(batch).await {
            Ok(SubmitStatus::Accepted) => {
                result.success += batch.len();
            }
            Ok(SubmitStatus::Rejected(status)) => {
                tracing::error!(batch = batch_no, %status, "batch rejected by marketplace");
                result.errors += batch.len();
            }
            Err(e) => {
                tracing::error!(batch = batch_no, error = %e, "batch submission failed");
                result.errors += batch.len();
            }
        }
        sent += batch.len();
    }

    result.cancelled = items.len() - sent;
    if result.cancelled > 0 {
        tracing::warn!(cancelled = result.cancelled, "run stopped before all batches were sent");
    }
    if result.errors > 0 {
        tracing::warn!(
            errors = result.errors,
            success = result.success,
            "some batches failed"
        );
    }
    result
}

/// Sleeps for `delay` unless cancelled first. Returns `false` on cancellation.
pub async fn pause(delay: Duration, cancel: &CancellationToken) -> bool {
    if delay.is_zero() {
        return !cancel.is_cancelled();
    }
    tokio::select! {
        () = cancel.cancelled() => false,
        () = tokio::time::sleep(delay) => true,
    }
}

#[cfg(test)]
#[path = "dispatch_test.rs"]
mod tests;
