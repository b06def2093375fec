//! Commit log offset assignment and one-shot reads.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::collections::HashSet;
use std::sync::Arc;

use bytes::Bytes;

use tailgate_core::{CommitLog, TailgateError};

#[test]
fn offsets_start_at_zero_without_gaps() {
    let log = CommitLog::new();
    assert!(log.is_empty());

    for i in 0..5u64 {
        let offset = log.append(Bytes::from(format!("rec-{i}"))).unwrap();
        assert_eq!(offset, i);
    }
    assert_eq!(log.len(), 5);

    for i in 0..5u64 {
        let rec = log.read(i).unwrap();
        assert_eq!(rec.offset, i);
        assert_eq!(rec.payload, Bytes::from(format!("rec-{i}")));
    }
}

#[test]
fn read_past_end_is_out_of_range_until_appended() {
    let log = CommitLog::new();
    log.append(Bytes::from_static(b"hello world")).unwrap();

    let err = log.read(1).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "OUT_OF_RANGE");
    assert!(matches!(err, TailgateError::OffsetOutOfRange { offset: 1, len: 1 }));

    log.append(Bytes::from_static(b"second")).unwrap();
    let first = log.read(1).unwrap();
    let again = log.read(1).unwrap();
    assert_eq!(first, again);
    assert_eq!(first.payload, Bytes::from_static(b"second"));
}

#[test]
fn huge_offset_is_out_of_range() {
    let log = CommitLog::new();
    let err = log.read(u64::MAX).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "OUT_OF_RANGE");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_appends_get_unique_dense_offsets() {
    let log = Arc::new(CommitLog::new());
    let producers = 8;
    let per_producer = 250;

    let mut handles = Vec::new();
    for p in 0..producers {
        let log = Arc::clone(&log);
        handles.push(tokio::spawn(async move {
            let mut got = Vec::with_capacity(per_producer);
            for i in 0..per_producer {
                let payload = Bytes::from(format!("{p}:{i}"));
                got.push((log.append(payload.clone()).unwrap(), payload));
            }
            got
        }));
    }

    let mut seen = HashSet::new();
    for h in handles {
        for (offset, payload) in h.await.unwrap() {
            assert!(seen.insert(offset), "duplicate offset {offset}");
            assert_eq!(log.read(offset).unwrap().payload, payload);
        }
    }

    let total = (producers * per_producer) as u64;
    assert_eq!(log.len(), total);
    assert_eq!(seen, (0..total).collect::<HashSet<_>>());
}
