//! Replay-latest broadcast of published states.

use futures_core::Stream;
use parking_lot::Mutex;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;

/// Latest value plus the subscriber list, under one lock.
///
/// A subscriber attaching receives the latest value before any value
/// published after it. Each subscriber sees values in publish order.
pub(crate) struct StateBroadcast<S> {
    inner: Mutex<BroadcastInner<S>>,
}

struct BroadcastInner<S> {
    latest: S,
    subscribers: Vec<mpsc::UnboundedSender<S>>,
}

impl<S: Clone + Send + 'static> StateBroadcast<S> {
    pub(crate) fn new(initial: S) -> Self {
        Self {
            inner: Mutex::new(BroadcastInner {
                latest: initial,
                subscribers: Vec::new(),
            }),
        }
    }

    pub(crate) fn subscribe(&self) -> StateStream<S> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.inner.lock();
        if tx.send(inner.latest.clone()).is_ok() {
            inner.subscribers.push(tx);
        }
        StateStream { rx }
    }

    /// Replace the latest value and deliver it to every live subscriber,
    /// dropping the ones whose stream is gone.
    pub(crate) fn publish(&self, value: S) {
        let mut inner = self.inner.lock();
        inner
            .subscribers
            .retain(|subscriber| subscriber.send(value.clone()).is_ok());
        inner.latest = value;
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        let mut inner = self.inner.lock();
        inner.subscribers.retain(|subscriber| !subscriber.is_closed());
        inner.subscribers.len()
    }
}

/// A subscription to a store's states.
///
/// Yields the state current at subscription time first, then every
/// published state in order. Dropping the stream detaches it.
#[derive(Debug)]
pub struct StateStream<S> {
    rx: mpsc::UnboundedReceiver<S>,
}

impl<S> StateStream<S> {
    /// Wait for the next state. Returns `None` once the store is gone and
    /// every buffered state was received.
    pub async fn recv(&mut self) -> Option<S> {
        self.rx.recv().await
    }

    /// The next buffered state, without waiting.
    pub fn try_recv(&mut self) -> Option<S> {
        self.rx.try_recv().ok()
    }

    /// Drain the buffer and return the most recent state, if any arrived.
    pub fn latest(&mut self) -> Option<S> {
        let mut latest = None;
        while let Some(state) = self.try_recv() {
            latest = Some(state);
        }
        latest
    }
}

impl<S> Stream for StateStream<S> {
    type Item = S;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<S>> {
        self.rx.poll_recv(cx)
    }
}
