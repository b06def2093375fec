//! Offset-addressed, append-only record log.
//!
//! - `CommitLog` owns offset assignment (0.., no gaps) and stores immutable records.
//! - `Tail` is the "tail -f" reader: a lazy, cancellable sequence that waits at the end of the
//!   log instead of failing.

mod commit_log;
mod tail;

pub use commit_log::{CommitLog, Record};
pub use tail::Tail;
