use std::sync::Arc;

use futures_util::Stream;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::error::{Result, TailgateError};
use crate::log::{CommitLog, Record};

/// Cursor over a [`CommitLog`] that blocks at the end instead of failing.
///
/// Records come out one at a time in strict offset order. Each tail owns its cursor; any number
/// of tails can follow the same log.
pub struct Tail {
    log: Arc<CommitLog>,
    appended: watch::Receiver<u64>,
    next_offset: u64,
    cancel: CancellationToken,
}

impl Tail {
    pub(crate) fn new(
        log: Arc<CommitLog>,
        appended: watch::Receiver<u64>,
        next_offset: u64,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            log,
            appended,
            next_offset,
            cancel,
        }
    }

    /// Offset of the record the next call to [`Tail::next`] will yield.
    pub fn next_offset(&self) -> u64 {
        self.next_offset
    }

    /// Wait for the next record.
    ///
    /// Returns `None` once cancelled. A non-range error is returned as `Some(Err(_))`; callers
    /// should stop after it.
    pub async fn next(&mut self) -> Option<Result<Record>> {
        loop {
            if self.cancel.is_cancelled() {
                return None;
            }

            // Mark the current length as seen *before* reading, so an append racing with the
            // read below still wakes the wait.
            let _ = self.appended.borrow_and_update();

            match self.log.read(self.next_offset) {
                Ok(record) => {
                    self.next_offset += 1;
                    return Some(Ok(record));
                }
                Err(TailgateError::OffsetOutOfRange { .. }) => {}
                Err(err) => return Some(Err(err)),
            }

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    tracing::debug!(next_offset = self.next_offset, "tail cancelled");
                    return None;
                }
                changed = self.appended.changed() => {
                    // sender lives inside the log we hold, so this only fails if the log is gone
                    if changed.is_err() {
                        return None;
                    }
                }
            }
        }
    }

    /// Adapt into a `Stream`. The stream ends on cancellation or right after the first error.
    pub fn into_stream(self) -> impl Stream<Item = Result<Record>> + Send + 'static {
        futures_util::stream::unfold(Some(self), |state| async move {
            let mut tail = state?;
            match tail.next().await? {
                Ok(record) => Some((Ok(record), Some(tail))),
                Err(err) => Some((Err(err), None)),
            }
        })
    }
}
