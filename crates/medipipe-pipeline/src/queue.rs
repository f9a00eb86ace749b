//! Bounded multi-producer, multi-consumer work queue.
//!
//! Built on a bounded `mpsc` channel with the receiver behind a shared
//! mutex so several workers can pull from the same queue. The channel's
//! close semantics double as the stage barrier: once every
//! [`QueueSender`] is dropped, [`QueueReceiver::take`] drains the buffer
//! and then returns `None` for good.
//!
//! Items are also counted: `push` increments an outstanding counter and
//! [`QueueReceiver::ack`] decrements it once processing of a taken item
//! has finished, so [`QueueDepth::is_idle`] distinguishes "buffer empty"
//! from "every item fully processed".

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{mpsc, Mutex};

/// Error returned by [`QueueSender::push`] when every consumer has exited.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("work queue closed: all consumers are gone")]
pub struct QueueClosed;

/// Create a bounded work queue holding at most `capacity` buffered items.
pub fn bounded<T>(capacity: usize) -> (QueueSender<T>, QueueReceiver<T>) {
    let (tx, rx) = mpsc::channel(capacity);
    let outstanding = Arc::new(AtomicUsize::new(0));
    (
        QueueSender {
            tx,
            outstanding: Arc::clone(&outstanding),
        },
        QueueReceiver {
            rx: Arc::new(Mutex::new(rx)),
            outstanding,
        },
    )
}

/// Producer half of the queue. Cloned once per producer; the queue closes
/// when the last clone is dropped.
pub struct QueueSender<T> {
    tx: mpsc::Sender<T>,
    outstanding: Arc<AtomicUsize>,
}

impl<T> Clone for QueueSender<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            outstanding: Arc::clone(&self.outstanding),
        }
    }
}

impl<T> QueueSender<T> {
    /// Enqueue an item, waiting while the queue is at capacity.
    pub async fn push(&self, item: T) -> Result<(), QueueClosed> {
        self.outstanding.fetch_add(1, Ordering::SeqCst);
        self.tx.send(item).await.map_err(|_| {
            self.outstanding.fetch_sub(1, Ordering::SeqCst);
            QueueClosed
        })
    }
}

/// Consumer half of the queue. Cloned once per worker.
pub struct QueueReceiver<T> {
    rx: Arc<Mutex<mpsc::Receiver<T>>>,
    outstanding: Arc<AtomicUsize>,
}

impl<T> Clone for QueueReceiver<T> {
    fn clone(&self) -> Self {
        Self {
            rx: Arc::clone(&self.rx),
            outstanding: Arc::clone(&self.outstanding),
        }
    }
}

impl<T> QueueReceiver<T> {
    /// Take the next item. Waits while the queue is empty but still open;
    /// returns `None` once the queue is closed and fully drained.
    pub async fn take(&self) -> Option<T> {
        self.rx.lock().await.recv().await
    }

    /// Record that one previously taken item has been fully processed.
    pub fn ack(&self) {
        self.outstanding.fetch_sub(1, Ordering::SeqCst);
    }

    /// Observation handle that stays valid after the receiver is dropped.
    pub fn depth_handle(&self) -> QueueDepth {
        QueueDepth {
            outstanding: Arc::clone(&self.outstanding),
        }
    }
}

/// Read-only view of how many pushed items have not yet been acked.
#[derive(Clone)]
pub struct QueueDepth {
    outstanding: Arc<AtomicUsize>,
}

impl QueueDepth {
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }

    /// True when every item ever pushed has been taken and acked.
    pub fn is_idle(&self) -> bool {
        self.outstanding() == 0
    }
}
