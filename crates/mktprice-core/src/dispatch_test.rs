use std::cell::RefCell;

use super::*;

/// Records batch sizes and answers from a script, one entry per call.
struct ScriptedSubmitter {
    calls: RefCell<Vec<usize>>,
    failing_calls: Vec<usize>,
    rejecting_calls: Vec<usize>,
    cancel_after_call: Option<(usize, CancellationToken)>,
}

impl ScriptedSubmitter {
    fn accepting() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            failing_calls: Vec::new(),
            rejecting_calls: Vec::new(),
            cancel_after_call: None,
        }
    }

    fn sizes(&self) -> Vec<usize> {
        self.calls.borrow().clone()
    }
}

impl BatchSubmitter<u32> for ScriptedSubmitter {
    type Error = String;

    async fn submit(&self, batch: &[u32]) -> Result<SubmitStatus, Self::Error> {
        self.calls.borrow_mut().push(batch.len());
        let call = self.calls.borrow().len();
        if let Some((n, token)) = &self.cancel_after_call {
            if call == *n {
                token.cancel();
            }
        }
        if self.failing_calls.contains(&call) {
            return Err("HTTP 500".to_string());
        }
        if self.rejecting_calls.contains(&call) {
            return Ok(SubmitStatus::Rejected("ERROR".to_string()));
        }
        Ok(SubmitStatus::Accepted)
    }
}

fn opts(batch_size: usize) -> DispatchOptions {
    DispatchOptions {
        batch_size,
        delay: Duration::ZERO,
        dry_run: false,
    }
}

fn items(n: u32) -> Vec<u32> {
    (0..n).collect()
}

// ---------------------------------------------------------------------------
// Batching
// ---------------------------------------------------------------------------

#[tokio::test]
async fn splits_into_fixed_size_batches() {
    let submitter = ScriptedSubmitter::accepting();
    let result =
        dispatch_batches(&submitter, &items(120), &opts(50), &CancellationToken::new()).await;
    assert_eq!(submitter.sizes(), [50, 50, 20]);
    assert_eq!(result.success, 120);
    assert_eq!(result.errors, 0);
    assert_eq!(result.cancelled, 0);
}

#[tokio::test]
async fn failed_middle_batch_counts_whole_batch_as_errors() {
    let submitter = ScriptedSubmitter {
        failing_calls: vec![2],
        ..ScriptedSubmitter::accepting()
    };
    let result =
        dispatch_batches(&submitter, &items(120), &opts(50), &CancellationToken::new()).await;
    assert_eq!(submitter.sizes(), [50, 50, 20], "later batches still run");
    assert_eq!(result.success, 70);
    assert_eq!(result.errors, 50);
}

#[tokio::test]
async fn rejected_status_counts_as_errors() {
    let submitter = ScriptedSubmitter {
        rejecting_calls: vec![1],
        ..ScriptedSubmitter::accepting()
    };
    let result =
        dispatch_batches(&submitter, &items(10), &opts(4), &CancellationToken::new()).await;
    assert_eq!(result.errors, 4);
    assert_eq!(result.success, 6);
}

#[tokio::test]
async fn empty_input_makes_no_calls() {
    let submitter = ScriptedSubmitter::accepting();
    let result = dispatch_batches(&submitter, &items(0), &opts(50), &CancellationToken::new()).await;
    assert!(submitter.sizes().is_empty());
    assert_eq!(result, BatchResult::default());
}

#[tokio::test]
async fn zero_batch_size_is_treated_as_one() {
    let submitter = ScriptedSubmitter::accepting();
    dispatch_batches(&submitter, &items(3), &opts(0), &CancellationToken::new()).await;
    assert_eq!(submitter.sizes(), [1, 1, 1]);
}

// ---------------------------------------------------------------------------
// Dry run
// ---------------------------------------------------------------------------

#[tokio::test]
async fn dry_run_never_calls_submitter() {
    let submitter = ScriptedSubmitter::accepting();
    let options = DispatchOptions {
        dry_run: true,
        ..opts(50)
    };
    let result =
        dispatch_batches(&submitter, &items(120), &options, &CancellationToken::new()).await;
    assert!(submitter.sizes().is_empty());
    assert_eq!(result.success, 120);
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cancelled_before_start_sends_nothing() {
    let submitter = ScriptedSubmitter::accepting();
    let token = CancellationToken::new();
    token.cancel();
    let result = dispatch_batches(&submitter, &items(120), &opts(50), &token).await;
    assert!(submitter.sizes().is_empty());
    assert_eq!(result.cancelled, 120);
    assert!(result.was_cancelled());
}

#[tokio::test]
async fn cancellation_interrupts_pause_between_batches() {
    let token = CancellationToken::new();
    let submitter = ScriptedSubmitter {
        cancel_after_call: Some((1, token.clone())),
        ..ScriptedSubmitter::accepting()
    };
    let options = DispatchOptions {
        delay: Duration::from_secs(3600),
        ..opts(50)
    };
    let result = dispatch_batches(&submitter, &items(120), &options, &token).await;
    assert_eq!(submitter.sizes(), [50]);
    assert_eq!(result.success, 50);
    assert_eq!(result.cancelled, 70);
}

#[test]
fn counters_add_up_with_skipped() {
    let result = BatchResult {
        success: 70,
        errors: 50,
        skipped: 0,
        cancelled: 0,
    }
    .with_skipped(5);
    assert_eq!(result.total(), 125);
}
