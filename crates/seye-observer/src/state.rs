//! Shared application state for the track feed server.
//!
//! [`AppState`] bundles the shared track store with the subscriber
//! registry, the broadcast engine that feeds it, and the command
//! handler. It is wrapped in [`Arc`] and injected via Axum's `State`
//! extractor.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use seye_core::command::CommandHandler;
use seye_core::config::SeyeConfig;
use seye_core::publish::Broadcaster;
use seye_core::store::SharedTrackStore;
use seye_types::SubscriberId;

use crate::broadcast::{BroadcastEngine, BroadcastError};
use crate::registry::{SubscriberRegistry, Subscription};

/// Shared state for the Axum application.
#[derive(Clone)]
pub struct AppState {
    /// The single authoritative track store.
    pub store: SharedTrackStore,
    /// Currently connected feed subscribers.
    pub registry: Arc<SubscriberRegistry>,
    /// Fan-out over [`AppState::registry`].
    pub engine: Arc<BroadcastEngine>,
    /// Deploy and remove command path.
    pub commands: CommandHandler,
    /// Artificial delay of the analysis endpoint.
    pub analyze_delay: Duration,
    /// Wall-clock time the state was created.
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Create application state over `store` using the broadcast and intel
    /// sections of `config`.
    pub fn new(store: SharedTrackStore, config: &SeyeConfig) -> Self {
        let registry = Arc::new(SubscriberRegistry::new(config.broadcast.subscriber_queue));
        let engine = Arc::new(BroadcastEngine::new(Arc::clone(&registry)));
        let commands = CommandHandler::new(
            Arc::clone(&store),
            Arc::clone(&engine) as Arc<dyn Broadcaster>,
        );
        Self {
            store,
            registry,
            engine,
            commands,
            analyze_delay: Duration::from_millis(config.intel.analyze_delay_ms),
            started_at: Utc::now(),
        }
    }

    /// The broadcaster to hand to the simulation clock.
    pub fn broadcaster(&self) -> Arc<dyn Broadcaster> {
        Arc::clone(&self.engine) as Arc<dyn Broadcaster>
    }

    /// Register a new subscriber and queue the current picture for it.
    ///
    /// Runs under the store lock: the store is seeded if empty, and the
    /// initial snapshot is queued before any tick or command can publish
    /// to the new subscriber, so its first frame is never older than a
    /// later one.
    ///
    /// # Errors
    ///
    /// Returns [`BroadcastError`] if the initial frame cannot be queued;
    /// the subscriber is deregistered in that case.
    pub async fn subscribe(&self) -> Result<Subscription, BroadcastError> {
        let mut store = self.store.lock().await;
        store.seed();
        let subscription = self.registry.add();
        let snapshot = store.snapshot();
        let result = self.engine.publish_to(subscription.id, &snapshot);
        drop(store);

        match result {
            Ok(()) => Ok(subscription),
            Err(e) => {
                self.registry.remove(subscription.id);
                Err(e)
            }
        }
    }

    /// Deregister a subscriber. Returns `false` if it was already gone,
    /// e.g. pruned by the broadcast engine.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        self.registry.remove(id)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use seye_core::store::{StoreSettings, TrackStore};
    use seye_types::TrackId;

    use super::*;

    fn state() -> AppState {
        let store =
            TrackStore::with_rng(StoreSettings::default(), StdRng::seed_from_u64(3)).into_shared();
        AppState::new(store, &SeyeConfig::default())
    }

    #[tokio::test]
    async fn subscribe_seeds_and_delivers_current_picture() {
        let state = state();
        let mut sub = state.subscribe().await.unwrap();

        let frame = sub.frames.recv().await.unwrap();
        let json: serde_json::Value = serde_json::from_str(frame.as_str()).unwrap();
        let records = json["data"].as_array().unwrap();

        let store = state.store.lock().await;
        assert_eq!(records.len(), store.len());
        let snapshot = store.snapshot();
        let ids: Vec<&str> = snapshot.ids().map(TrackId::as_str).collect();
        let sent: Vec<&str> = records.iter().filter_map(|r| r["id"].as_str()).collect();
        assert_eq!(sent, ids);
    }

    #[tokio::test]
    async fn subscribe_only_reaches_the_new_subscriber() {
        let state = state();
        let mut first = state.subscribe().await.unwrap();
        assert!(first.frames.recv().await.is_some());

        let _second = state.subscribe().await.unwrap();
        assert!(first.frames.try_recv().is_err());
        assert_eq!(state.registry.len(), 2);
    }

    #[tokio::test]
    async fn deploy_reaches_existing_subscribers() {
        let state = state();
        let mut sub = state.subscribe().await.unwrap();
        let _initial = sub.frames.recv().await.unwrap();

        let request = seye_types::DeployRequest {
            name: Some("Viper 7".to_owned()),
            from_lat: Some(18.0),
            from_lng: Some(76.0),
            to_lat: Some(22.0),
            to_lng: Some(80.0),
            is_friend: Some(false),
        };
        let ack = state.commands.deploy(request).await.unwrap();
        let id = ack.id.unwrap();

        let frame = sub.frames.recv().await.unwrap();
        let json: serde_json::Value = serde_json::from_str(frame.as_str()).unwrap();
        let deployed = json["data"]
            .as_array()
            .unwrap()
            .iter()
            .find(|r| r["id"] == id.as_str())
            .unwrap();
        assert_eq!(deployed["type"], "UNKNOWN/THREAT");
        assert_eq!(deployed["name"], "Viper 7");
        assert_eq!(deployed["targetLat"], 22.0);
    }

    #[tokio::test]
    async fn unsubscribe_shrinks_registry_once() {
        let state = state();
        let sub = state.subscribe().await.unwrap();
        assert_eq!(state.registry.len(), 1);

        assert!(state.unsubscribe(sub.id));
        assert!(state.registry.is_empty());
        assert!(!state.unsubscribe(sub.id));
    }

    #[tokio::test]
    async fn dropped_subscription_is_pruned_on_next_publish() {
        let state = state();
        let mut kept = state.subscribe().await.unwrap();
        let dropped = state.subscribe().await.unwrap();
        let dropped_id = dropped.id;
        let _initial = kept.frames.recv().await.unwrap();
        drop(dropped);
        assert_eq!(state.registry.len(), 2);

        let snapshot = state.store.lock().await.advance_all();
        let report = state.engine.publish_all(&snapshot);

        assert_eq!(report.delivered, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(state.registry.len(), 1);
        assert!(state.registry.get(dropped_id).is_none());
        assert!(kept.frames.recv().await.is_some());
        assert!(!state.unsubscribe(dropped_id));
    }
}
