//! Event channel between a running fetch and the host control loop.
//!
//! Single producer (the fetch task), single consumer (the host). Events are
//! delivered in emission order; the host drains them with a non-blocking
//! [`EventReceiver::poll`] from its periodic tick.

use tokio::sync::mpsc;
use tracing::debug;

use crate::frame::Sequence;

/// Progress and completion of one fetch invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchEvent {
    /// Percentage of forecast hours attempted, `0.0..=100.0`.
    Progress(f64),
    /// Terminal event carrying every frame that was retrieved, possibly none.
    Finished(Sequence),
}

impl FetchEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, FetchEvent::Finished(_))
    }
}

/// Result of a non-blocking poll.
#[derive(Debug, PartialEq)]
pub enum Polled {
    Event(FetchEvent),
    /// Nothing queued yet; the fetch is still running.
    Pending,
    /// The producer is gone and the queue is drained.
    Closed,
}

pub fn channel() -> (EventSender, EventReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventSender { tx }, EventReceiver { rx })
}

#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<FetchEvent>,
}

impl EventSender {
    /// Queue an event. Never blocks; a consumer that went away is not an error.
    pub fn emit(&self, event: FetchEvent) {
        if self.tx.send(event).is_err() {
            debug!("fetch event dropped: receiver closed");
        }
    }

    pub fn progress(&self, percent: f64) {
        self.emit(FetchEvent::Progress(percent.clamp(0.0, 100.0)));
    }
}

#[derive(Debug)]
pub struct EventReceiver {
    rx: mpsc::UnboundedReceiver<FetchEvent>,
}

impl EventReceiver {
    /// Take the next queued event without waiting.
    pub fn poll(&mut self) -> Polled {
        match self.rx.try_recv() {
            Ok(event) => Polled::Event(event),
            Err(mpsc::error::TryRecvError::Empty) => Polled::Pending,
            Err(mpsc::error::TryRecvError::Disconnected) => Polled::Closed,
        }
    }

    /// Wait for the next event; `None` once the producer has finished.
    pub async fn recv(&mut self) -> Option<FetchEvent> {
        self.rx.recv().await
    }

    /// Wait for every remaining event.
    pub async fn collect(mut self) -> Vec<FetchEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.recv().await {
            events.push(event);
        }
        events
    }
}
