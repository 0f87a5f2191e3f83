// crates/client/src/poller.rs
//! Repeating status checks against the backend until a job reaches a
//! terminal state.
//!
//! Starting a loop hands back a [`PollHandle`]; stopping the handle (or
//! dropping it) cancels the loop. Checks never overlap: a tick is not
//! eligible to fire until the previous check has finished, so at most one
//! check is outstanding per loop at any instant.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use podsum_types::{JobStatus, SummaryData};

use crate::api::ApiClient;
use crate::decode::{decode_summary, DecodeError};
use crate::error::ApiError;

/// Shown when the backend reports failure without a reason of its own.
pub const DEFAULT_FAILURE_MESSAGE: &str = "Processing failed";

/// Progress emitted by a running poll loop.
#[derive(Debug)]
pub enum PollUpdate {
    /// Backend-reported status, emitted on every successful check, terminal
    /// checks included.
    Status(JobStatus),
    /// The loop ended; no further updates follow.
    Done(PollOutcome),
}

/// Terminal result of one poll loop.
#[derive(Debug)]
pub enum PollOutcome {
    /// COMPLETED with a payload that decoded cleanly.
    Summary(SummaryData),
    /// COMPLETED with no payload attached.
    CompletedEmpty,
    /// COMPLETED, but the payload would not decode.
    DecodeFailed(DecodeError),
    /// The backend marked the job FAILED.
    Failed { message: String },
    /// A non-404 failure talking to the status endpoint.
    Transport(ApiError),
}

/// Cancellation handle for a running poll loop.
///
/// `stop` is idempotent; stopping a finished loop is a no-op. A check
/// already in flight when `stop` fires is allowed to complete, but the loop
/// discards its outcome instead of emitting it.
#[derive(Debug)]
pub struct PollHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl PollHandle {
    /// Signals the loop to stop before its next check.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Starts a poll loop for `job_id`: one immediate check, then one per
/// `interval` until a terminal state, a fatal transport error, or
/// cancellation. Must be called from within a tokio runtime.
pub fn start_polling(
    api: ApiClient,
    job_id: impl Into<String>,
    interval: Duration,
) -> (PollHandle, mpsc::UnboundedReceiver<PollUpdate>) {
    let cancel = CancellationToken::new();
    let (tx, rx) = mpsc::unbounded_channel();

    let task = tokio::spawn(run_loop(api, job_id.into(), interval, cancel.clone(), tx));

    (PollHandle { cancel, task }, rx)
}

async fn run_loop(
    api: ApiClient,
    job_id: String,
    interval: Duration,
    cancel: CancellationToken,
    tx: mpsc::UnboundedSender<PollUpdate>,
) {
    let mut ticker = tokio::time::interval(interval);
    // A slow check pushes the next tick back instead of letting ticks burst.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        // Cancellation outranks a tick that became ready in the same instant.
        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                debug!(job_id = %job_id, "poll loop cancelled");
                return;
            }
            _ = ticker.tick() => {}
        }

        let checked = api.job_result(&job_id).await;

        // A stop that raced the check above wins; the result is discarded.
        if cancel.is_cancelled() {
            debug!(job_id = %job_id, "discarding in-flight check after cancellation");
            return;
        }

        let record = match checked {
            Ok(Some(record)) => record,
            Ok(None) => {
                // Row not persisted yet; expected right after registration.
                debug!(job_id = %job_id, "job not found yet, still polling");
                continue;
            }
            Err(err) => {
                warn!(job_id = %job_id, error = %err, "status check failed, stopping");
                let _ = tx.send(PollUpdate::Done(PollOutcome::Transport(err)));
                return;
            }
        };

        if tx.send(PollUpdate::Status(record.status)).is_err() {
            // Receiver gone; nobody left to report to.
            return;
        }

        match record.status {
            JobStatus::Pending | JobStatus::Processing => {}
            JobStatus::Completed => {
                let outcome = match record.summary_result.as_deref() {
                    Some(raw) => match decode_summary(raw) {
                        Ok(summary) => PollOutcome::Summary(summary),
                        Err(err) => {
                            warn!(job_id = %job_id, error = %err, "summary payload failed to decode");
                            PollOutcome::DecodeFailed(err)
                        }
                    },
                    None => PollOutcome::CompletedEmpty,
                };
                let _ = tx.send(PollUpdate::Done(outcome));
                return;
            }
            JobStatus::Failed => {
                let message = record
                    .error_message
                    .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string());
                let _ = tx.send(PollUpdate::Done(PollOutcome::Failed { message }));
                return;
            }
        }
    }
}
