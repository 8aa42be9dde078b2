//! Registry of connected feed subscribers.
//!
//! Each subscriber is a bounded queue of pre-serialized frames. The
//! `WebSocket` task owning the connection drains its queue into the
//! socket; the broadcast engine only ever pushes with `try_send`, so a
//! slow or vanished client can never stall a tick or another client.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use axum::extract::ws::Utf8Bytes;
use seye_types::SubscriberId;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::debug;

/// Default number of frames buffered per subscriber.
pub const DEFAULT_QUEUE_CAPACITY: usize = 16;

/// A single delivery that did not reach its subscriber.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    /// The subscriber's queue is full; this frame was dropped for it.
    #[error("subscriber {subscriber} is lagging, frame dropped")]
    Lagging {
        /// The slow subscriber.
        subscriber: SubscriberId,
    },

    /// The subscriber's connection is gone.
    #[error("subscriber {subscriber} disconnected")]
    Disconnected {
        /// The departed subscriber.
        subscriber: SubscriberId,
    },

    /// No subscriber with this id is registered.
    #[error("subscriber {subscriber} is not registered")]
    Unknown {
        /// The id that was looked up.
        subscriber: SubscriberId,
    },
}

/// What a connection receives when it registers.
#[derive(Debug)]
pub struct Subscription {
    /// Registry id of the new subscriber.
    pub id: SubscriberId,
    /// Frames addressed to this subscriber, in publish order.
    pub frames: mpsc::Receiver<Utf8Bytes>,
}

/// Sending side of one registered subscriber.
#[derive(Debug, Clone)]
pub struct SubscriberHandle {
    id: SubscriberId,
    tx: mpsc::Sender<Utf8Bytes>,
}

impl SubscriberHandle {
    /// Id of the subscriber.
    pub const fn id(&self) -> SubscriberId {
        self.id
    }

    /// Queue `frame` for this subscriber without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::Lagging`] when the queue is full and
    /// [`DeliveryError::Disconnected`] when the receiver was dropped.
    pub fn deliver(&self, frame: &Utf8Bytes) -> Result<(), DeliveryError> {
        self.tx.try_send(frame.clone()).map_err(|e| match e {
            TrySendError::Full(_) => DeliveryError::Lagging {
                subscriber: self.id,
            },
            TrySendError::Closed(_) => DeliveryError::Disconnected {
                subscriber: self.id,
            },
        })
    }
}

/// The set of currently connected subscribers.
#[derive(Debug)]
pub struct SubscriberRegistry {
    subscribers: RwLock<BTreeMap<SubscriberId, mpsc::Sender<Utf8Bytes>>>,
    capacity: usize,
}

impl SubscriberRegistry {
    /// Create an empty registry whose subscribers buffer `capacity` frames.
    ///
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        Self {
            subscribers: RwLock::new(BTreeMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Register a new subscriber.
    pub fn add(&self) -> Subscription {
        let id = SubscriberId::new();
        let (tx, frames) = mpsc::channel(self.capacity);
        let total = {
            let mut subscribers = self
                .subscribers
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            subscribers.insert(id, tx);
            subscribers.len()
        };
        debug!(subscriber = %id, total, "Subscriber registered");
        Subscription { id, frames }
    }

    /// Deregister a subscriber. Returns whether it was registered.
    ///
    /// Safe to call any number of times.
    pub fn remove(&self, id: SubscriberId) -> bool {
        let removed = self
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .is_some();
        if removed {
            debug!(subscriber = %id, "Subscriber removed");
        }
        removed
    }

    /// Handle of one registered subscriber.
    pub fn get(&self, id: SubscriberId) -> Option<SubscriberHandle> {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .map(|tx| SubscriberHandle { id, tx: tx.clone() })
    }

    /// Every subscriber registered at the moment of the call.
    ///
    /// The membership is captured on each call; later adds and removes
    /// do not affect an iterator already handed out.
    pub fn all(&self) -> impl Iterator<Item = SubscriberHandle> + use<> {
        let handles: Vec<SubscriberHandle> = self
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(id, tx)| SubscriberHandle {
                id: *id,
                tx: tx.clone(),
            })
            .collect();
        handles.into_iter()
    }

    /// Number of registered subscribers.
    pub fn len(&self) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nobody is subscribed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SubscriberRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_CAPACITY)
    }
}
