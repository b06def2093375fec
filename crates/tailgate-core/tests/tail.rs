//! Tail ("tail -f") semantics: ordering, waiting at the end, cancellation.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures_util::StreamExt;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use tailgate_core::CommitLog;

const WAIT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn tail_attached_before_data_sees_appends_in_order() {
    let log = Arc::new(CommitLog::new());
    let mut tail = log.tail(0, CancellationToken::new());

    let producer = {
        let log = Arc::clone(&log);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            log.append(Bytes::from_static(b"A")).unwrap();
            log.append(Bytes::from_static(b"B")).unwrap();
        })
    };

    let a = timeout(WAIT, tail.next()).await.unwrap().unwrap().unwrap();
    let b = timeout(WAIT, tail.next()).await.unwrap().unwrap().unwrap();
    producer.await.unwrap();

    assert_eq!((a.offset, a.payload), (0, Bytes::from_static(b"A")));
    assert_eq!((b.offset, b.payload), (1, Bytes::from_static(b"B")));
    assert_eq!(tail.next_offset(), 2);
}

#[tokio::test]
async fn tail_drains_backlog_then_waits() {
    let log = Arc::new(CommitLog::new());
    for i in 0..3 {
        log.append(Bytes::from(vec![i])).unwrap();
    }

    let mut tail = log.tail(1, CancellationToken::new());
    assert_eq!(tail.next().await.unwrap().unwrap().offset, 1);
    assert_eq!(tail.next().await.unwrap().unwrap().offset, 2);

    // end of log: must block, not fail
    assert!(timeout(Duration::from_millis(50), tail.next()).await.is_err());

    log.append(Bytes::from_static(b"late")).unwrap();
    let late = timeout(WAIT, tail.next()).await.unwrap().unwrap().unwrap();
    assert_eq!(late.offset, 3);
}

#[tokio::test]
async fn cancel_ends_a_waiting_tail_promptly() {
    let log = Arc::new(CommitLog::new());
    let cancel = CancellationToken::new();
    let mut tail = log.tail(0, cancel.clone());

    let waiter = tokio::spawn(async move { tail.next().await.is_none() });
    tokio::time::sleep(Duration::from_millis(20)).await;
    cancel.cancel();

    let ended_clean = timeout(Duration::from_secs(1), waiter).await.unwrap().unwrap();
    assert!(ended_clean, "cancelled tail must end without a record or error");
}

#[tokio::test]
async fn dropping_the_stream_releases_the_wait() {
    let log = Arc::new(CommitLog::new());
    let mut stream = Box::pin(log.tail(0, CancellationToken::new()).into_stream());

    // parked at the end of the log
    assert!(timeout(Duration::from_millis(50), stream.next()).await.is_err());
    assert_eq!(Arc::strong_count(&log), 2);

    drop(stream);
    assert_eq!(Arc::strong_count(&log), 1);

    // the log stays usable for others
    assert_eq!(log.append(Bytes::from_static(b"x")).unwrap(), 0);
}

#[tokio::test]
async fn aborting_the_reader_task_releases_the_tail() {
    let log = Arc::new(CommitLog::new());
    let stream = log.tail(0, CancellationToken::new()).into_stream();

    let handle = tokio::spawn(async move {
        let mut stream = Box::pin(stream);
        stream.next().await
    });
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(Arc::strong_count(&log), 2);

    handle.abort();
    let res = timeout(Duration::from_secs(1), handle).await.unwrap();
    assert!(res.expect_err("must be aborted").is_cancelled());
    assert_eq!(Arc::strong_count(&log), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn independent_tails_each_see_every_record() {
    let log = Arc::new(CommitLog::new());
    let cancel = CancellationToken::new();
    let total = 200u64;

    let mut readers = Vec::new();
    for _ in 0..3 {
        let stream = log.tail(0, cancel.child_token()).into_stream();
        readers.push(tokio::spawn(async move {
            stream
                .take(total as usize)
                .map(|r| r.unwrap().offset)
                .collect::<Vec<_>>()
                .await
        }));
    }

    let mut producers = Vec::new();
    for _ in 0..4 {
        let log = Arc::clone(&log);
        producers.push(tokio::spawn(async move {
            for _ in 0..total / 4 {
                log.append(Bytes::from_static(b"p")).unwrap();
                tokio::task::yield_now().await;
            }
        }));
    }
    for p in producers {
        p.await.unwrap();
    }

    for r in readers {
        let offsets = timeout(WAIT, r).await.unwrap().unwrap();
        assert_eq!(offsets, (0..total).collect::<Vec<_>>());
    }
}

#[tokio::test]
async fn stream_ends_when_parent_token_cancels() {
    let log = Arc::new(CommitLog::new());
    let root = CancellationToken::new();
    let mut stream = Box::pin(log.tail(0, root.child_token()).into_stream());

    log.append(Bytes::from_static(b"one")).unwrap();
    assert_eq!(stream.next().await.unwrap().unwrap().offset, 0);

    root.cancel();
    assert!(timeout(Duration::from_secs(1), stream.next()).await.unwrap().is_none());
}
