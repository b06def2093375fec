use std::sync::{Arc, RwLock};
use std::time::SystemTime;

use bytes::Bytes;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::error::{Result, TailgateError};
use crate::log::Tail;

/// One immutable entry of the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub offset: u64,
    pub payload: Bytes,
    pub appended_at: SystemTime,
}

/// In-memory commit log.
///
/// Appends serialize on the write lock; reads share the read lock and never block each other.
/// Every append publishes the new length on a `watch` channel so tails can wake up without
/// polling.
pub struct CommitLog {
    records: RwLock<Vec<Record>>,
    appended: watch::Sender<u64>,
}

impl Default for CommitLog {
    fn default() -> Self {
        Self::new()
    }
}

impl CommitLog {
    pub fn new() -> Self {
        let (appended, _) = watch::channel(0);
        Self {
            records: RwLock::new(Vec::new()),
            appended,
        }
    }

    /// Append `payload`; returns the assigned offset (the length before the append).
    pub fn append(&self, payload: Bytes) -> Result<u64> {
        let mut records = self
            .records
            .write()
            .map_err(|_| TailgateError::Internal("commit log lock poisoned".into()))?;

        let offset = records.len() as u64;
        records.push(Record {
            offset,
            payload,
            appended_at: SystemTime::now(),
        });
        // published under the lock so the watched length never goes backwards
        self.appended.send_replace(offset + 1);
        tracing::trace!(offset, "record appended");
        Ok(offset)
    }

    /// Read the record at `offset`, or `OffsetOutOfRange` past the end.
    pub fn read(&self, offset: u64) -> Result<Record> {
        let records = self
            .records
            .read()
            .map_err(|_| TailgateError::Internal("commit log lock poisoned".into()))?;

        usize::try_from(offset)
            .ok()
            .and_then(|i| records.get(i))
            .cloned()
            .ok_or(TailgateError::OffsetOutOfRange {
                offset,
                len: records.len() as u64,
            })
    }

    pub fn len(&self) -> u64 {
        *self.appended.borrow()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Open a tail reader starting at `start_offset`.
    ///
    /// The tail ends when `cancel` fires or when it is dropped; reaching the end of the log only
    /// makes it wait.
    pub fn tail(self: &Arc<Self>, start_offset: u64, cancel: CancellationToken) -> Tail {
        Tail::new(Arc::clone(self), self.appended.subscribe(), start_offset, cancel)
    }
}
