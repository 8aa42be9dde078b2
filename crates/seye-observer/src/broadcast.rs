//! Fan-out of track snapshots to every subscriber.
//!
//! A snapshot is serialized exactly once into a `flightData` frame and
//! the same bytes are queued for every subscriber. Failures are per
//! subscriber: a lagging client loses this frame (the next tick carries
//! the full picture again), a disconnected client is dropped from the
//! registry, and neither affects anyone else.

use std::sync::Arc;

use axum::extract::ws::Utf8Bytes;
use seye_core::publish::{BroadcastReport, Broadcaster};
use seye_types::{FlightRecord, ServerMessage, SubscriberId, TrackSnapshot};
use tracing::{debug, error, warn};

use crate::registry::{DeliveryError, SubscriberRegistry};

/// Errors from a targeted publish.
#[derive(Debug, thiserror::Error)]
pub enum BroadcastError {
    /// The frame could not be serialized.
    #[error("failed to encode frame: {0}")]
    Encode(#[from] serde_json::Error),

    /// The frame could not be queued for the subscriber.
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

/// Serialize a snapshot into a `flightData` frame.
///
/// # Errors
///
/// Returns the serializer error; with plain data this only happens for
/// non-finite floats that `serde_json` refuses to emit.
pub fn encode_snapshot(snapshot: &TrackSnapshot) -> Result<Utf8Bytes, serde_json::Error> {
    let records = snapshot.tracks.iter().map(FlightRecord::from).collect();
    encode(&ServerMessage::FlightData(records))
}

/// Serialize any server frame.
///
/// # Errors
///
/// Returns the serializer error.
pub fn encode(message: &ServerMessage) -> Result<Utf8Bytes, serde_json::Error> {
    serde_json::to_string(message).map(Utf8Bytes::from)
}

/// Delivers snapshots to the subscribers in a [`SubscriberRegistry`].
#[derive(Debug, Clone)]
pub struct BroadcastEngine {
    registry: Arc<SubscriberRegistry>,
}

impl BroadcastEngine {
    /// Create an engine over `registry`.
    pub const fn new(registry: Arc<SubscriberRegistry>) -> Self {
        Self { registry }
    }

    /// The registry this engine delivers to.
    pub const fn registry(&self) -> &Arc<SubscriberRegistry> {
        &self.registry
    }

    /// Deliver `snapshot` to a single subscriber.
    ///
    /// # Errors
    ///
    /// Returns [`BroadcastError::Encode`] if serialization fails, or
    /// [`BroadcastError::Delivery`] if the subscriber is unknown, gone,
    /// or lagging.
    pub fn publish_to(
        &self,
        subscriber: SubscriberId,
        snapshot: &TrackSnapshot,
    ) -> Result<(), BroadcastError> {
        let frame = encode_snapshot(snapshot)?;
        let handle = self
            .registry
            .get(subscriber)
            .ok_or(DeliveryError::Unknown { subscriber })?;
        handle.deliver(&frame)?;
        debug!(%subscriber, tracks = snapshot.len(), "Snapshot sent to subscriber");
        Ok(())
    }

    fn record_failure(&self, err: &DeliveryError) {
        match err {
            DeliveryError::Disconnected { subscriber } => {
                debug!(%subscriber, "Dropping disconnected subscriber");
                self.registry.remove(*subscriber);
            }
            DeliveryError::Lagging { .. } | DeliveryError::Unknown { .. } => {
                warn!(error = %err, "Delivery failed");
            }
        }
    }
}

impl Broadcaster for BroadcastEngine {
    fn publish_all(&self, snapshot: &TrackSnapshot) -> BroadcastReport {
        let frame = match encode_snapshot(snapshot) {
            Ok(frame) => frame,
            Err(e) => {
                error!(error = %e, tick = snapshot.tick, "Failed to encode snapshot");
                return BroadcastReport {
                    delivered: 0,
                    failed: self.registry.len(),
                };
            }
        };

        let mut report = BroadcastReport::default();
        for handle in self.registry.all() {
            match handle.deliver(&frame) {
                Ok(()) => report.delivered = report.delivered.saturating_add(1),
                Err(e) => {
                    report.failed = report.failed.saturating_add(1);
                    self.record_failure(&e);
                }
            }
        }
        report
    }
}
