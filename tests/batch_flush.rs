mod common;

use std::sync::Arc;
use std::time::Duration;

use rchan::store::FlushRecord;
use rchan::{Bridge, ListStore, Message, MemoryStore};

fn record(key: &str, appended: usize, trimmed_to: usize) -> FlushRecord {
    FlushRecord {
        key: key.to_string(),
        appended,
        trimmed_to,
    }
}

#[tokio::test]
async fn full_batch_is_one_round_trip() {
    common::init_logging();
    let store = Arc::new(MemoryStore::new());
    let cfg = common::fast_config("batch")
        .with_size(1000)
        .with_batch(5)
        .with_flush_interval(Duration::from_secs(60));
    let (write, handle) = Bridge::writer::<_, String>(Arc::clone(&store), cfg).unwrap();

    for i in 0..5 {
        write.send(format!("m{i}")).await.unwrap();
    }

    let flushed = common::eventually(Duration::from_secs(2), || !store.flushes().is_empty()).await;
    assert!(flushed, "batch did not flush eagerly");
    assert_eq!(store.flushes(), vec![record("batch", 5, 1000)]);

    write.close();
    let stats = handle.join().await.unwrap();
    // nothing pending on close, so no extra round trip
    assert_eq!(store.flushes().len(), 1);
    assert_eq!(stats.flush_by_size, 1);
    assert_eq!(stats.flushed, 5);
}

#[tokio::test]
async fn partial_batch_flushes_on_timer() {
    common::init_logging();
    let store = Arc::new(MemoryStore::new());
    let cfg = common::fast_config("timer")
        .with_size(1000)
        .with_batch(5)
        .with_flush_interval(Duration::from_millis(50));
    let (write, handle) = Bridge::writer::<_, String>(Arc::clone(&store), cfg).unwrap();

    for i in 0..4 {
        write.send(format!("m{i}")).await.unwrap();
    }
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(store.flushes(), vec![record("timer", 4, 1000)]);
    assert_eq!(store.len("timer").await.unwrap(), 4);
    assert_eq!(handle.stats().flush_by_timer, 1);

    write.close();
    handle.join().await.unwrap();
    assert_eq!(store.flushes().len(), 1);
}

#[tokio::test]
async fn close_flushes_the_remainder_once() {
    common::init_logging();
    let store = Arc::new(MemoryStore::new());
    let cfg = common::fast_config("tail")
        .with_batch(100)
        .with_flush_interval(Duration::from_secs(60));
    let (write, handle) = Bridge::writer::<_, String>(Arc::clone(&store), cfg).unwrap();

    for i in 0..3 {
        write.send(format!("m{i}")).await.unwrap();
    }
    write.close();
    let stats = handle.join().await.unwrap();

    assert_eq!(store.flushes().len(), 1);
    assert_eq!(stats.flushes, 1);
    assert_eq!(stats.flush_by_size + stats.flush_by_timer, 0);
    assert_eq!(store.len("tail").await.unwrap(), 3);
}

#[tokio::test]
async fn every_flush_trims_to_size_keeping_the_newest() {
    common::init_logging();
    let store = Arc::new(MemoryStore::new());
    let cfg = common::fast_config("capped")
        .with_size(10)
        .with_buff(32)
        .with_batch(25)
        .with_flush_interval(Duration::from_secs(60));
    let (write, handle) = Bridge::writer::<_, String>(Arc::clone(&store), cfg).unwrap();

    let sent: Vec<String> = (0..60).map(|i| format!("m{i:02}")).collect();
    for m in &sent {
        write.send(m.clone()).await.unwrap();
        assert!(store.len("capped").await.unwrap() <= 10);
    }
    write.close();
    handle.join().await.unwrap();

    let appended: Vec<usize> = store.flushes().iter().map(|f| f.appended).collect();
    assert_eq!(appended, vec![25, 25, 10]);
    assert!(store.flushes().iter().all(|f| f.trimmed_to == 10));

    let newest: Vec<Message> = sent[50..].iter().map(|s| Message::from(s.as_str())).collect();
    assert_eq!(store.contents("capped"), newest);
}
