mod common;

use std::sync::Arc;
use std::time::Duration;

use rchan::{Bridge, ListStore, Message, MemoryStore};

#[tokio::test]
async fn full_read_buffer_stops_popping() {
    common::init_logging();
    let store = Arc::new(MemoryStore::new());
    let seeded: Vec<Message> = (0..30).map(|i| Message::from(format!("m{i}"))).collect();
    store.push_back("bp", &seeded).await.unwrap();

    let cfg = common::fast_config("bp").with_buff(10).with_batch(4);
    let (read, stop, handle) = Bridge::reader::<_, Message>(Arc::clone(&store), cfg).unwrap();

    assert!(common::eventually(Duration::from_secs(2), || read.len() == 10).await);
    assert_eq!(store.len("bp").await.unwrap(), 20);

    // ~10 ticks with a full buffer
    let pops_when_full = store.pop_calls();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(store.pop_calls(), pops_when_full);
    assert_eq!(store.len("bp").await.unwrap(), 20);

    for expected in &seeded[..5] {
        assert_eq!(read.recv().await.as_ref(), Some(expected));
    }
    let refilled = common::eventually(Duration::from_secs(2), || read.len() == 10).await;
    assert!(refilled);
    assert_eq!(store.len("bp").await.unwrap(), 15);

    stop.stop();
    let stats = handle.join().await.unwrap();
    assert_eq!(stats.received, 15);
    assert_eq!(stats.drained_back, 10);
    assert_eq!(store.len("bp").await.unwrap(), 25);
}

#[tokio::test]
async fn pops_never_exceed_spare_capacity() {
    common::init_logging();
    let store = Arc::new(MemoryStore::new());
    let seeded: Vec<Message> = (0..7).map(|i| Message::from(format!("m{i}"))).collect();
    store.push_back("spare", &seeded).await.unwrap();

    // batch larger than the buffer
    let cfg = common::fast_config("spare").with_buff(3).with_batch(100);
    let (read, stop, handle) = Bridge::reader::<_, Message>(Arc::clone(&store), cfg).unwrap();

    assert!(common::eventually(Duration::from_secs(2), || read.len() == 3).await);
    assert_eq!(store.len("spare").await.unwrap(), 4);

    stop.stop();
    handle.join().await.unwrap();
    assert_eq!(store.len("spare").await.unwrap(), 7);
}
