//! Reload broker.
//!
//! A single task owns the subscriber set. Register, deregister and broadcast
//! requests travel through one unbounded FIFO queue and are applied strictly
//! in the order issued, so a broadcast never reaches a subscriber registered
//! after it and never reaches one already deregistered.
//!
//! Each subscriber has a one-slot buffer. Delivery uses `try_send`; a
//! subscriber whose slot is still full misses that broadcast and the broker
//! moves on.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;

/// Pending reload signals a subscriber can hold.
const SUBSCRIBER_BUFFER: usize = 1;

type SubscriberId = u64;

/// Requests handled by the broker task.
#[derive(Debug)]
pub(crate) enum BrokerMessage {
    Register {
        id: SubscriberId,
        sender: mpsc::Sender<()>,
    },
    Deregister(SubscriberId),
    Broadcast,
}

/// Owner of the subscriber set.
pub(crate) struct Broker {
    subscribers: HashMap<SubscriberId, mpsc::Sender<()>>,
    receiver: mpsc::UnboundedReceiver<BrokerMessage>,
}

impl Broker {
    /// Apply one message to the subscriber set.
    fn apply(&mut self, message: BrokerMessage) {
        match message {
            BrokerMessage::Register { id, sender } => {
                self.subscribers.insert(id, sender);
                tracing::debug!(id, subscribers = self.subscribers.len(), "Subscriber registered");
            }
            BrokerMessage::Deregister(id) => {
                self.subscribers.remove(&id);
                tracing::debug!(id, subscribers = self.subscribers.len(), "Subscriber removed");
            }
            BrokerMessage::Broadcast => {
                let mut delivered = 0;
                for (id, sender) in &self.subscribers {
                    match sender.try_send(()) {
                        Ok(()) => delivered += 1,
                        Err(mpsc::error::TrySendError::Full(())) => {
                            tracing::debug!(id, "Subscriber busy, dropping reload");
                        }
                        // Session ended; its deregistration is already queued.
                        Err(mpsc::error::TrySendError::Closed(())) => {}
                    }
                }
                tracing::debug!(delivered, subscribers = self.subscribers.len(), "Broadcast reload");
            }
        }
    }

    /// Process messages until every handle is dropped.
    pub(crate) async fn run(mut self) {
        while let Some(message) = self.receiver.recv().await {
            self.apply(message);
        }
        tracing::debug!("Broker stopped");
    }

    #[cfg(test)]
    fn process_pending(&mut self) {
        while let Ok(message) = self.receiver.try_recv() {
            self.apply(message);
        }
    }
}

/// Create a broker and a handle to it. The broker does nothing until run.
pub(crate) fn channel() -> (Broker, BrokerHandle) {
    let (sender, receiver) = mpsc::unbounded_channel();
    let broker = Broker {
        subscribers: HashMap::new(),
        receiver,
    };
    let handle = BrokerHandle {
        sender,
        next_id: Arc::new(AtomicU64::new(0)),
    };
    (broker, handle)
}

/// Spawn a broker task and return its handle.
pub(crate) fn spawn() -> BrokerHandle {
    let (broker, handle) = channel();
    tokio::spawn(broker.run());
    handle
}

/// Cloneable handle for talking to the broker.
#[derive(Clone, Debug)]
pub(crate) struct BrokerHandle {
    sender: mpsc::UnboundedSender<BrokerMessage>,
    next_id: Arc<AtomicU64>,
}

impl BrokerHandle {
    /// Register a new subscriber.
    pub(crate) fn subscribe(&self) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = mpsc::channel(SUBSCRIBER_BUFFER);
        // A closed broker means shutdown; the subscription then ends on first recv.
        let _ = self.sender.send(BrokerMessage::Register { id, sender });
        Subscription {
            id,
            receiver,
            broker: self.sender.clone(),
        }
    }

    /// Ask the broker to signal every current subscriber.
    pub(crate) fn broadcast(&self) {
        let _ = self.sender.send(BrokerMessage::Broadcast);
    }
}

/// One registered subscriber. Deregisters itself exactly once when dropped.
#[derive(Debug)]
pub(crate) struct Subscription {
    id: SubscriberId,
    receiver: mpsc::Receiver<()>,
    broker: mpsc::UnboundedSender<BrokerMessage>,
}

impl Subscription {
    /// Wait for the next reload signal. `None` once the broker is gone.
    pub(crate) async fn recv(&mut self) -> Option<()> {
        self.receiver.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let _ = self.broker.send(BrokerMessage::Deregister(self.id));
    }
}
