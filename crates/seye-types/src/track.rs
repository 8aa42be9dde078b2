//! Track and snapshot types.
//!
//! A [`Track`] is one simulated aircraft. The track store owns every
//! live track exclusively; everything downstream of it (broadcast,
//! REST reads) only ever sees a [`TrackSnapshot`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::ids::TrackId;

/// Display label for friendly tracks.
pub const FRIENDLY_LABEL: &str = "FRIENDLY";

/// Display label for hostile tracks.
pub const HOSTILE_LABEL: &str = "UNKNOWN/THREAT";

/// Geographic coordinate pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl Position {
    /// Create a position from latitude and longitude.
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Which side a track belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Affiliation {
    /// Own or allied aircraft.
    Friendly,
    /// Unidentified or hostile aircraft.
    Hostile,
}

impl Affiliation {
    /// Map the wire-level `isFriend` flag to an affiliation.
    pub const fn from_is_friend(is_friend: bool) -> Self {
        if is_friend { Self::Friendly } else { Self::Hostile }
    }

    /// Whether this affiliation is friendly.
    pub const fn is_friendly(self) -> bool {
        matches!(self, Self::Friendly)
    }

    /// Display classification derived from the affiliation.
    pub const fn classification(self) -> &'static str {
        match self {
            Self::Friendly => FRIENDLY_LABEL,
            Self::Hostile => HOSTILE_LABEL,
        }
    }
}

/// One simulated entity on the radar picture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Unique id within the store.
    pub id: TrackId,
    /// Current position.
    pub position: Position,
    /// Heading in degrees. Normalized into `[0, 360)` once per tick,
    /// before the course correction is applied.
    pub heading: f64,
    /// Distance travelled per tick, in degrees.
    pub speed: f64,
    /// Friendly or hostile.
    pub affiliation: Affiliation,
    /// Callsign supplied by a deploy command.
    pub name: Option<String>,
    /// Destination supplied by a deploy command (informational only).
    pub destination: Option<Position>,
}

impl Track {
    /// Display classification derived from [`Track::affiliation`].
    pub const fn classification(&self) -> &'static str {
        self.affiliation.classification()
    }
}

/// Immutable view of the full track collection at one instant.
///
/// Cloning is cheap: the tracks live behind an [`Arc`].
#[derive(Debug, Clone, PartialEq)]
pub struct TrackSnapshot {
    /// Number of ticks the store had completed when the snapshot was taken.
    pub tick: u64,
    /// Tracks in store order.
    pub tracks: Arc<[Track]>,
}

impl TrackSnapshot {
    /// Number of tracks in the snapshot.
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Whether the snapshot holds no tracks.
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Iterate over the ids in snapshot order.
    pub fn ids(&self) -> impl Iterator<Item = &TrackId> {
        self.tracks.iter().map(|t| &t.id)
    }
}
