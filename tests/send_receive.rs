mod common;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rchan::{Bridge, BridgeState, ListStore, Message, MemoryStore};

#[tokio::test]
async fn concurrent_consumers_see_every_message_exactly_once() {
    common::init_logging();
    let store = Arc::new(MemoryStore::new());
    let cfg = common::fast_config("my-queue-test")
        .with_size(10_000)
        .with_buff(10)
        .with_batch(1);

    let (read, stop, reader) = Bridge::reader::<_, String>(Arc::clone(&store), cfg.clone()).unwrap();
    let (write, writer) = Bridge::writer::<_, String>(Arc::clone(&store), cfg).unwrap();

    let counters: HashMap<&str, usize> = [
        ("a", 100),
        ("b", 5),
        ("c", 17),
        ("some-very-long-string", 1111),
    ]
    .into_iter()
    .collect();
    let total: usize = counters.values().sum();

    let seen: Arc<Mutex<HashMap<String, usize>>> = Arc::default();
    let mut consumers = Vec::new();
    for _ in 0..5 {
        let read = read.clone();
        let seen = Arc::clone(&seen);
        consumers.push(tokio::spawn(async move {
            while let Some(q) = read.recv().await {
                *seen.lock().entry(q).or_default() += 1;
            }
        }));
    }

    for (k, v) in &counters {
        for _ in 0..*v {
            write.send(k.to_string()).await.unwrap();
        }
    }
    write.close();
    writer.join().await.unwrap();

    let all_seen = common::eventually(Duration::from_secs(10), || {
        seen.lock().values().sum::<usize>() == total
    })
    .await;
    assert!(all_seen, "consumers did not receive everything");

    stop.stop();
    let stats = reader.join().await.unwrap();
    for c in consumers {
        c.await.unwrap();
    }

    let seen = seen.lock();
    for (k, v) in &counters {
        assert_eq!(seen.get(*k).copied().unwrap_or(0), *v, "key({k})");
    }
    assert_eq!(seen.len(), counters.len());
    assert_eq!(stats.received as usize, total);
    assert_eq!(store.len("my-queue-test").await.unwrap(), 0);
}

#[tokio::test]
async fn hundred_a_five_b_through_one_bridge() {
    common::init_logging();
    let store = Arc::new(MemoryStore::new());
    let cfg = common::fast_config("scenario")
        .with_size(10_000)
        .with_buff(10)
        .with_batch(1);
    let (read, write, handle) = Bridge::open::<_, String>(Arc::clone(&store), cfg).unwrap();
    let probe = read.clone();

    let consumer = tokio::spawn(async move {
        let mut got: HashMap<String, usize> = HashMap::new();
        while let Some(m) = read.recv().await {
            *got.entry(m).or_default() += 1;
        }
        got
    });

    for _ in 0..100 {
        write.send("a".to_string()).await.unwrap();
    }
    for _ in 0..5 {
        write.send("b".to_string()).await.unwrap();
    }

    // let consumers take everything before closing, otherwise the tail is pushed back
    let delivered = common::eventually(Duration::from_secs(10), || {
        handle.stats().received == 105 && probe.is_empty()
    })
    .await;
    assert!(delivered);

    write.close();
    let got = consumer.await.unwrap();
    let stats = handle.join().await.unwrap();

    assert_eq!(got.get("a"), Some(&100));
    assert_eq!(got.get("b"), Some(&5));
    assert_eq!(got.len(), 2);
    assert_eq!(stats.drained_back, 0);
    assert_eq!(store.len("scenario").await.unwrap(), 0);
}

#[tokio::test]
async fn writes_land_in_fifo_order_and_read_back_in_fifo_order() {
    common::init_logging();
    let store = Arc::new(MemoryStore::new());
    let cfg = common::fast_config("fifo").with_size(100).with_buff(8).with_batch(7);

    let (write, writer) = Bridge::writer::<_, Vec<u8>>(Arc::clone(&store), cfg.clone()).unwrap();
    let sent: Vec<Vec<u8>> = (0..50).map(|i| format!("m{i:02}").into_bytes()).collect();
    for m in &sent {
        write.send(m.clone()).await.unwrap();
    }
    write.close();
    let wstats = writer.join().await.unwrap();
    assert_eq!(wstats.flushed, 50);

    let expected: Vec<Message> = sent.iter().cloned().map(Message::from).collect();
    assert_eq!(store.contents("fifo"), expected);

    let (read, stop, reader) = Bridge::reader::<_, Vec<u8>>(Arc::clone(&store), cfg).unwrap();
    let mut got = Vec::new();
    while got.len() < sent.len() {
        let m = tokio::time::timeout(Duration::from_secs(5), read.recv())
            .await
            .expect("reader stalled")
            .expect("read endpoint closed early");
        got.push(m);
    }
    stop.stop();
    reader.closed().await;
    assert_eq!(reader.state(), BridgeState::Closed);
    reader.join().await.unwrap();

    assert_eq!(got, sent);
    assert_eq!(read.recv().await, None);
}
