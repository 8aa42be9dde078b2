//! The canonical track collection.
//!
//! [`TrackStore`] is the single source of truth for every live track.
//! It is plain data plus an injected random generator; sharing happens
//! one level up through [`SharedTrackStore`], a `tokio` mutex that every
//! tick, command, and new-connection snapshot goes through. Holding that
//! lock across "mutate, snapshot, publish" is what makes each operation
//! atomic as seen by subscribers.
//!
//! # Invariants
//!
//! - Track ids are unique; [`TrackStore::insert`] rejects duplicates.
//! - The store self-heals to non-empty: [`TrackStore::advance_all`]
//!   seeds before moving anything when the collection is empty, and the
//!   connect path seeds before taking the first snapshot.
//! - Tracks are only removed by [`TrackStore::remove`].

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use seye_types::{Affiliation, Position, Track, TrackId, TrackSnapshot};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::{GeoBox, SeyeConfig};
use crate::motion::{self, MotionParams};

/// Numeric suffix of the first seeded track (`FLT-1000`).
const FIRST_SEED_NUMBER: usize = 1000;

/// The store as shared between the clock, commands, and connections.
pub type SharedTrackStore = Arc<Mutex<TrackStore>>;

/// Errors returned by store mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A track with this id is already live.
    #[error("track {id} already exists")]
    DuplicateId {
        /// The conflicting id.
        id: TrackId,
    },
}

/// Parameters of initial population.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeedParams {
    /// Fewest tracks created by one seeding.
    pub min_tracks: usize,
    /// Most tracks created by one seeding.
    pub max_tracks: usize,
    /// Probability that a seeded track is friendly.
    pub friendly_ratio: f64,
    /// Slowest speed, degrees per tick.
    pub min_speed: f64,
    /// Fastest speed, degrees per tick.
    pub max_speed: f64,
    /// Area in which seeded tracks appear.
    pub spawn: GeoBox,
}

/// Everything the store needs besides its generator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StoreSettings {
    /// Initial population parameters.
    pub seed: SeedParams,
    /// Motion model constants.
    pub motion: MotionParams,
}

impl StoreSettings {
    /// Derive store settings from the loaded configuration.
    pub const fn from_config(config: &SeyeConfig) -> Self {
        let sim = &config.simulation;
        Self {
            seed: SeedParams {
                min_tracks: sim.min_tracks,
                max_tracks: sim.max_tracks,
                friendly_ratio: sim.friendly_ratio,
                min_speed: sim.min_speed,
                max_speed: sim.max_speed,
                spawn: config.region.spawn,
            },
            motion: MotionParams {
                bounds: config.region.bounds,
                jitter_deg: sim.course_jitter_deg,
            },
        }
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self::from_config(&SeyeConfig::default())
    }
}

/// Owner of every live track.
pub struct TrackStore {
    tracks: Vec<Track>,
    settings: StoreSettings,
    rng: Box<dyn RngCore + Send>,
    tick: u64,
}

impl core::fmt::Debug for TrackStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TrackStore")
            .field("tracks", &self.tracks.len())
            .field("tick", &self.tick)
            .finish_non_exhaustive()
    }
}

impl TrackStore {
    /// Create an empty store drawing randomness from the operating system.
    pub fn new(settings: StoreSettings) -> Self {
        Self::with_rng(settings, StdRng::from_os_rng())
    }

    /// Create an empty store with an explicit generator.
    pub fn with_rng(settings: StoreSettings, rng: impl RngCore + Send + 'static) -> Self {
        Self {
            tracks: Vec::new(),
            settings,
            rng: Box::new(rng),
            tick: 0,
        }
    }

    /// Create an empty store from configuration, seeded deterministically
    /// when `simulation.seed` is set.
    pub fn from_config(config: &SeyeConfig) -> Self {
        let settings = StoreSettings::from_config(config);
        match config.simulation.seed {
            Some(seed) => Self::with_rng(settings, StdRng::seed_from_u64(seed)),
            None => Self::new(settings),
        }
    }

    /// Wrap the store for sharing across tasks.
    pub fn into_shared(self) -> SharedTrackStore {
        Arc::new(Mutex::new(self))
    }

    /// Populate an empty store with a random batch of tracks.
    ///
    /// A no-op on a non-empty store. Returns the number of tracks created.
    pub fn seed(&mut self) -> usize {
        if !self.tracks.is_empty() {
            return 0;
        }

        let params = self.settings.seed;
        let count = self.rng.random_range(params.min_tracks..=params.max_tracks);
        for i in 0..count {
            let affiliation = Affiliation::from_is_friend(self.rng.random_bool(params.friendly_ratio));
            let track = Track {
                id: TrackId::new(format!("FLT-{}", FIRST_SEED_NUMBER.saturating_add(i))),
                position: Position::new(
                    self.rng.random_range(params.spawn.min_lat..params.spawn.max_lat),
                    self.rng.random_range(params.spawn.min_lng..params.spawn.max_lng),
                ),
                heading: self.rng.random_range(0.0..360.0),
                speed: self.sample_speed(),
                affiliation,
                name: None,
                destination: None,
            };
            self.tracks.push(track);
        }

        info!(count, "Track store seeded");
        count
    }

    /// Advance every track by one tick and return the resulting snapshot.
    ///
    /// Seeds first if the store is empty, so the returned snapshot is
    /// never empty.
    pub fn advance_all(&mut self) -> TrackSnapshot {
        self.seed();

        let params = self.settings.motion;
        let mut bounces = 0_usize;
        for track in &mut self.tracks {
            let u: f64 = self.rng.random();
            if motion::advance(track, &params, u).any() {
                bounces = bounces.saturating_add(1);
            }
        }
        self.tick = self.tick.saturating_add(1);

        debug!(tick = self.tick, tracks = self.tracks.len(), bounces, "Tracks advanced");
        self.snapshot()
    }

    /// Add a fully specified track.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateId`] if the id is already live.
    pub fn insert(&mut self, track: Track) -> Result<(), StoreError> {
        if self.get(&track.id).is_some() {
            return Err(StoreError::DuplicateId { id: track.id });
        }
        debug!(id = %track.id, "Track inserted");
        self.tracks.push(track);
        Ok(())
    }

    /// Remove the track with `id`. Returns whether a track was removed.
    ///
    /// Removing an unknown id leaves the store untouched.
    pub fn remove(&mut self, id: &TrackId) -> bool {
        let before = self.tracks.len();
        self.tracks.retain(|t| &t.id != id);
        let removed = self.tracks.len() != before;
        debug!(%id, removed, "Track remove requested");
        removed
    }

    /// Immutable copy of the current collection.
    pub fn snapshot(&self) -> TrackSnapshot {
        TrackSnapshot {
            tick: self.tick,
            tracks: Arc::from(self.tracks.as_slice()),
        }
    }

    /// Look up a live track.
    pub fn get(&self, id: &TrackId) -> Option<&Track> {
        self.tracks.iter().find(|t| &t.id == id)
    }

    /// Number of live tracks.
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Whether no track is live.
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Ticks completed so far.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Draw a speed from the configured seeding range.
    pub fn sample_speed(&mut self) -> f64 {
        let params = self.settings.seed;
        self.rng.random_range(params.min_speed..=params.max_speed)
    }
}
