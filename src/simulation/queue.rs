//! Unbounded FIFO queue between entities
//!
//! Producers never block: the backlog grows as far as it has to, trading
//! memory for never stalling a road or city tick on a slow consumer.
//! Consumers either block on [`UnboundedQueue::pop`], poll with
//! [`UnboundedQueue::try_pop`], or wait on [`UnboundedQueue::receiver`] inside
//! a `select!` next to their timers.

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use std::sync::RwLock;
use std::time::Duration;

use super::locks::{read, write};

pub struct UnboundedQueue<T> {
    /// `None` once the queue is closed
    producer: RwLock<Option<Sender<T>>>,
    consumer: Receiver<T>,
}

impl<T> UnboundedQueue<T> {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self {
            producer: RwLock::new(Some(tx)),
            consumer: rx,
        }
    }

    /// Appends an item to the back of the queue. Never blocks.
    ///
    /// # Panics
    ///
    /// Panics if the queue has been closed. A producer outliving its consumer
    /// is a teardown-ordering bug in the caller and cannot be recovered from.
    pub fn push(&self, item: T) {
        let producer = read(&self.producer);
        let Some(tx) = producer.as_ref() else {
            panic!("UnboundedQueue: push after close");
        };
        if tx.send(item).is_err() {
            panic!("UnboundedQueue: consumer side disconnected");
        }
    }

    /// Blocks until an item is available.
    ///
    /// Returns `None` once the queue is closed and every buffered item has
    /// been handed out.
    pub fn pop(&self) -> Option<T> {
        self.consumer.recv().ok()
    }

    /// Like [`pop`](Self::pop), giving up after `timeout`
    pub fn pop_timeout(&self, timeout: Duration) -> Option<T> {
        match self.consumer.recv_timeout(timeout) {
            Ok(item) => Some(item),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Takes the front item if one is ready
    pub fn try_pop(&self) -> Option<T> {
        self.consumer.try_recv().ok()
    }

    /// Consumer end, for waiting on the queue alongside other channels
    pub fn receiver(&self) -> &Receiver<T> {
        &self.consumer
    }

    /// Disables production for good. Items already buffered stay available
    /// to consumers; closing twice is a no-op.
    pub fn close(&self) {
        write(&self.producer).take();
    }

    pub fn is_closed(&self) -> bool {
        read(&self.producer).is_none()
    }

    /// Removes and returns everything currently buffered
    pub fn drain(&self) -> Vec<T> {
        self.consumer.try_iter().collect()
    }

    pub fn len(&self) -> usize {
        self.consumer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.consumer.is_empty()
    }
}

impl<T> Default for UnboundedQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
