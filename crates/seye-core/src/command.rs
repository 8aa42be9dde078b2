//! Deploy and remove commands.
//!
//! Commands arrive from any connected client, concurrently with the
//! tick. Each one takes the store lock, mutates, snapshots, and
//! publishes before releasing it, so subscribers observe the mutation
//! as a single step between two ticks.

use std::sync::Arc;

use chrono::Utc;
use seye_types::{Affiliation, CommandAck, DeployRequest, Position, Track, TrackId};
use tracing::{info, warn};
use validator::Validate;

use crate::geo;
use crate::publish::Broadcaster;
use crate::store::{SharedTrackStore, StoreError};

/// Errors reported back to the client that issued a command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// The deploy request is missing a field or has an out-of-range value.
    #[error("validation failed: {reason}")]
    Validation {
        /// Every problem found, joined with `; `.
        reason: String,
    },

    /// The store refused the mutation.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<validator::ValidationErrors> for CommandError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut problems: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    e.message
                        .as_ref()
                        .map_or_else(|| format!("{field}: {}", e.code), ToString::to_string)
                })
            })
            .collect();
        problems.sort();
        Self::Validation {
            reason: problems.join("; "),
        }
    }
}

/// A deploy request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct DeployOrder {
    /// Trimmed callsign.
    pub name: String,
    /// Starting position.
    pub from: Position,
    /// Destination, used for the initial heading.
    pub to: Position,
    /// Friendly or hostile.
    pub affiliation: Affiliation,
}

impl TryFrom<DeployRequest> for DeployOrder {
    type Error = CommandError;

    fn try_from(request: DeployRequest) -> Result<Self, Self::Error> {
        request.validate()?;

        let (Some(name), Some(from_lat), Some(from_lng), Some(to_lat), Some(to_lng), Some(is_friend)) = (
            request.name,
            request.from_lat,
            request.from_lng,
            request.to_lat,
            request.to_lng,
            request.is_friend,
        ) else {
            return Err(CommandError::Validation {
                reason: "all deploy fields are required".to_owned(),
            });
        };

        let name = name.trim().to_owned();
        if name.is_empty() {
            return Err(CommandError::Validation {
                reason: "name must not be empty".to_owned(),
            });
        }

        Ok(Self {
            name,
            from: Position::new(from_lat, from_lng),
            to: Position::new(to_lat, to_lng),
            affiliation: Affiliation::from_is_friend(is_friend),
        })
    }
}

/// Build the id of a deployed track: upper-cased callsign with runs of
/// whitespace replaced by `-`, then `-<unix millis>`.
pub fn deploy_id(name: &str, now_millis: i64) -> TrackId {
    let slug = name
        .split_whitespace()
        .map(str::to_uppercase)
        .collect::<Vec<_>>()
        .join("-");
    TrackId::new(format!("{slug}-{now_millis}"))
}

/// Validates and applies client commands.
#[derive(Clone)]
pub struct CommandHandler {
    store: SharedTrackStore,
    broadcaster: Arc<dyn Broadcaster>,
}

impl CommandHandler {
    /// Create a handler over the shared store.
    pub fn new(store: SharedTrackStore, broadcaster: Arc<dyn Broadcaster>) -> Self {
        Self { store, broadcaster }
    }

    /// Deploy a new track and broadcast the updated picture.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::Validation`] for a malformed request, or
    /// [`CommandError::Store`] if the generated id is already live.
    pub async fn deploy(&self, request: DeployRequest) -> Result<CommandAck, CommandError> {
        self.deploy_at(request, Utc::now().timestamp_millis()).await
    }

    /// [`deploy`](Self::deploy) with an explicit timestamp for the id.
    ///
    /// # Errors
    ///
    /// Same as [`deploy`](Self::deploy).
    pub async fn deploy_at(
        &self,
        request: DeployRequest,
        now_millis: i64,
    ) -> Result<CommandAck, CommandError> {
        let order = DeployOrder::try_from(request).inspect_err(|e| {
            warn!(error = %e, "Deploy rejected");
        })?;

        let id = deploy_id(&order.name, now_millis);
        let heading = geo::initial_bearing(order.from, order.to);

        let mut store = self.store.lock().await;
        let track = Track {
            id: id.clone(),
            position: order.from,
            heading,
            speed: store.sample_speed(),
            affiliation: order.affiliation,
            name: Some(order.name.clone()),
            destination: Some(order.to),
        };
        store.insert(track).inspect_err(|e| {
            warn!(error = %e, "Deploy rejected");
        })?;
        let snapshot = store.snapshot();
        let report = self.broadcaster.publish_all(&snapshot);
        drop(store);

        info!(
            %id,
            heading,
            affiliation = ?order.affiliation,
            delivered = report.delivered,
            "Track deployed"
        );

        Ok(CommandAck::success(
            format!("Aircraft \"{}\" deployed as {id}", order.name),
            Some(id),
        ))
    }

    /// Remove a track and broadcast the updated picture.
    ///
    /// Always succeeds; an unknown id leaves the store unchanged.
    pub async fn retract(&self, id: &TrackId) -> CommandAck {
        let mut store = self.store.lock().await;
        let removed = store.remove(id);
        let snapshot = store.snapshot();
        let report = self.broadcaster.publish_all(&snapshot);
        drop(store);

        info!(%id, removed, delivered = report.delivered, "Track remove applied");

        let message = if removed {
            format!("Aircraft {id} removed")
        } else {
            format!("Aircraft {id} not present")
        };
        CommandAck::success(message, Some(id.clone()))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]

    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use seye_types::AckStatus;

    use super::*;
    use crate::publish::testing::RecordingBroadcaster;
    use crate::store::{StoreSettings, TrackStore};

    fn setup() -> (SharedTrackStore, Arc<RecordingBroadcaster>, CommandHandler) {
        let store =
            TrackStore::with_rng(StoreSettings::default(), StdRng::seed_from_u64(5)).into_shared();
        let recorder = Arc::new(RecordingBroadcaster::default());
        let handler = CommandHandler::new(
            Arc::clone(&store),
            Arc::clone(&recorder) as Arc<dyn Broadcaster>,
        );
        (store, recorder, handler)
    }

    fn eagle() -> DeployRequest {
        DeployRequest {
            name: Some("eagle one".to_owned()),
            from_lat: Some(20.0),
            from_lng: Some(77.0),
            to_lat: Some(20.0),
            to_lng: Some(80.0),
            is_friend: Some(true),
        }
    }

    #[test]
    fn deploy_id_slugs_the_callsign() {
        assert_eq!(
            deploy_id("  viper   seven ", 1_700_000_000_000).as_str(),
            "VIPER-SEVEN-1700000000000"
        );
    }

    #[test]
    fn blank_name_is_rejected() {
        let request = DeployRequest {
            name: Some("   ".to_owned()),
            ..eagle()
        };
        let err = DeployOrder::try_from(request).unwrap_err();
        assert!(matches!(err, CommandError::Validation { .. }));
    }

    #[test]
    fn missing_fields_are_listed() {
        let request = DeployRequest {
            to_lat: None,
            is_friend: None,
            ..eagle()
        };
        let CommandError::Validation { reason } = DeployOrder::try_from(request).unwrap_err()
        else {
            panic!("expected validation error");
        };
        assert!(reason.contains("toLat is required"));
        assert!(reason.contains("isFriend is required"));
    }

    #[tokio::test]
    async fn deploy_inserts_and_broadcasts() {
        let (store, recorder, handler) = setup();

        let ack = handler.deploy_at(eagle(), 42).await.unwrap();
        assert_eq!(ack.status, AckStatus::Success);
        assert_eq!(ack.id, Some(TrackId::new("EAGLE-ONE-42")));

        let last = recorder.last().unwrap();
        assert!(last.ids().any(|id| id.as_str() == "EAGLE-ONE-42"));

        let guard = store.lock().await;
        let track = guard.get(&TrackId::new("EAGLE-ONE-42")).unwrap();
        assert_eq!(track.name.as_deref(), Some("eagle one"));
        assert!(track.affiliation.is_friendly());
        // Due east along the equator-ish parallel.
        assert!((track.heading - 89.5).abs() < 1.0);
        assert!((0.05..=0.10).contains(&track.speed));
    }

    #[tokio::test]
    async fn invalid_deploy_never_broadcasts() {
        let (store, recorder, handler) = setup();
        let result = handler.deploy_at(DeployRequest::default(), 1).await;
        assert!(matches!(result, Err(CommandError::Validation { .. })));
        assert_eq!(recorder.count(), 0);
        assert!(store.lock().await.is_empty());
    }

    #[tokio::test]
    async fn duplicate_deploy_is_rejected() {
        let (store, recorder, handler) = setup();
        handler.deploy_at(eagle(), 7).await.unwrap();
        let err = handler.deploy_at(eagle(), 7).await.unwrap_err();
        assert_eq!(
            err,
            CommandError::Store(StoreError::DuplicateId {
                id: TrackId::new("EAGLE-ONE-7")
            })
        );
        assert_eq!(recorder.count(), 1);
        assert_eq!(store.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn retract_unknown_id_succeeds_and_broadcasts() {
        let (store, recorder, handler) = setup();
        store.lock().await.seed();
        let before = store.lock().await.snapshot();

        let ack = handler.retract(&TrackId::new("GHOST-1")).await;
        assert_eq!(ack.status, AckStatus::Success);
        assert_eq!(recorder.count(), 1);
        assert_eq!(store.lock().await.snapshot(), before);
    }

    #[tokio::test]
    async fn retract_removes_track() {
        let (store, recorder, handler) = setup();
        store.lock().await.seed();

        let ack = handler.retract(&TrackId::new("FLT-1000")).await;
        assert_eq!(ack.message, "Aircraft FLT-1000 removed");
        let last = recorder.last().unwrap();
        assert!(last.ids().all(|id| id.as_str() != "FLT-1000"));
    }

    #[tokio::test]
    async fn concurrent_deploys_and_ticks_stay_consistent() {
        let (store, recorder, handler) = setup();
        let clock = crate::clock::SimulationClock::new(
            Arc::clone(&store),
            Arc::clone(&recorder) as Arc<dyn Broadcaster>,
            std::time::Duration::from_millis(1),
        )
        .unwrap();

        let ticker = tokio::spawn(async move {
            for _ in 0..50 {
                clock.tick_once().await;
                tokio::task::yield_now().await;
            }
        });
        let deployer = tokio::spawn(async move {
            for i in 0..50 {
                handler.deploy_at(eagle(), i).await.unwrap();
                tokio::task::yield_now().await;
            }
        });
        ticker.await.unwrap();
        deployer.await.unwrap();

        let published = recorder.published.lock().unwrap();
        assert_eq!(published.len(), 100);
        let mut last_deployed = 0_usize;
        for snapshot in published.iter() {
            let ids: Vec<&str> = snapshot.ids().map(TrackId::as_str).collect();
            let mut unique = ids.clone();
            unique.sort_unstable();
            unique.dedup();
            assert_eq!(unique.len(), ids.len(), "duplicate id in a snapshot");
            // Deployed tracks only ever accumulate.
            let deployed = ids.iter().filter(|id| id.starts_with("EAGLE-ONE-")).count();
            assert!(deployed >= last_deployed);
            last_deployed = deployed;
        }
        assert_eq!(last_deployed, 50);
    }
}
