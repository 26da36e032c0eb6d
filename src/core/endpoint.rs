//! Local endpoints handed to producers and consumers.
//!
//! Both are thin, clonable wrappers over bounded `flume` channels carrying
//! [`Message`]; the payload type parameter only picks the marshaling adapter.

use futures::{Stream, StreamExt};
use parking_lot::Mutex;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::core::error::BridgeError;
use crate::core::lifecycle::{BridgeState, Lifecycle};
use crate::core::message::{Message, Payload};
use crate::metrics;

/// Producer side. Closing it (or dropping every clone) is the only
/// shutdown signal a combined bridge understands.
pub struct WriteHandle<T = Message> {
    // shared by all clones so one `close` closes them all
    tx: Arc<Mutex<Option<flume::Sender<Message>>>>,
    lifecycle: Lifecycle,
    capacity: usize,
    _payload: PhantomData<fn(T)>,
}

impl<T: Payload> WriteHandle<T> {
    pub(crate) fn new(tx: flume::Sender<Message>, lifecycle: Lifecycle, capacity: usize) -> Self {
        Self {
            tx: Arc::new(Mutex::new(Some(tx))),
            lifecycle,
            capacity,
            _payload: PhantomData,
        }
    }

    fn sender(&self) -> Result<flume::Sender<Message>, BridgeError> {
        self.tx.lock().clone().ok_or(BridgeError::QueueClosed)
    }

    /// Enqueues a message, waiting while the write buffer is full.
    pub async fn send(&self, msg: T) -> Result<(), BridgeError> {
        let tx = self.sender()?;
        tx.send_async(msg.into_message())
            .await
            .map_err(|_| BridgeError::QueueClosed)?;
        metrics::inc_sent(1);
        Ok(())
    }

    pub fn try_send(&self, msg: T) -> Result<(), BridgeError> {
        let tx = self.sender()?;
        tx.try_send(msg.into_message()).map_err(|e| match e {
            flume::TrySendError::Full(_) => BridgeError::QueueFull,
            flume::TrySendError::Disconnected(_) => BridgeError::QueueClosed,
        })?;
        metrics::inc_sent(1);
        Ok(())
    }

    /// Closes the write endpoint for every clone. Safe to call repeatedly.
    ///
    /// Messages already accepted are still flushed.
    pub fn close(&self) {
        if self.tx.lock().take().is_some() {
            self.lifecycle.advance(BridgeState::DrainingWrite);
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.lock().is_none()
    }

    /// Messages waiting for the writer.
    pub fn len(&self) -> usize {
        self.tx.lock().as_ref().map_or(0, |tx| tx.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T> Clone for WriteHandle<T> {
    fn clone(&self) -> Self {
        Self {
            tx: Arc::clone(&self.tx),
            lifecycle: self.lifecycle.clone(),
            capacity: self.capacity,
            _payload: PhantomData,
        }
    }
}

impl<T> fmt::Debug for WriteHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteHandle")
            .field("closed", &self.tx.lock().is_none())
            .field("capacity", &self.capacity)
            .finish()
    }
}

/// Consumer side. Yields `None` once the bridge has shut down and every
/// buffered message has been taken.
pub struct ReadHandle<T = Message> {
    rx: flume::Receiver<Message>,
    capacity: usize,
    _payload: PhantomData<fn() -> T>,
}

impl<T: Payload> ReadHandle<T> {
    pub(crate) fn new(rx: flume::Receiver<Message>, capacity: usize) -> Self {
        Self {
            rx,
            capacity,
            _payload: PhantomData,
        }
    }

    pub async fn recv(&self) -> Option<T> {
        self.rx.recv_async().await.ok().map(T::from_message)
    }

    pub fn try_recv(&self) -> Option<T> {
        self.rx.try_recv().ok().map(T::from_message)
    }

    pub fn into_stream(self) -> impl Stream<Item = T> + Send + 'static {
        self.rx.into_stream().map(T::from_message)
    }

    /// True once the bridge dropped its side; buffered messages may remain.
    pub fn is_disconnected(&self) -> bool {
        self.rx.is_disconnected()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T> Clone for ReadHandle<T> {
    fn clone(&self) -> Self {
        Self {
            rx: self.rx.clone(),
            capacity: self.capacity,
            _payload: PhantomData,
        }
    }
}

impl<T> fmt::Debug for ReadHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadHandle")
            .field("len", &self.rx.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}
