//! Per-track motion model.
//!
//! A deliberately simple heading/speed random walk. One call to
//! [`advance`] is one tick for one track:
//!
//! 1. Move `speed` degrees along `heading` (`Δlat = s·cos h`,
//!    `Δlng = s·sin h`).
//! 2. Bounce: leaving the latitude band reflects the heading to
//!    `180 − h`; leaving the longitude band reflects it to `360 − h`.
//!    Both checks run independently.
//! 3. Normalize the heading into `[0, 360)`.
//! 4. Add a course correction of `(u − 0.5) · jitter` degrees.
//!
//! Step 4 runs after normalization, so a stored heading may sit slightly
//! outside `[0, 360)` until the next tick's step 3 folds it back.
//!
//! The function owns no randomness: the caller supplies the uniform draw
//! `u`, which keeps the model deterministic under test.

use seye_types::Track;

use crate::config::GeoBox;
use crate::geo::normalize_degrees;

/// Constants of the motion model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionParams {
    /// Box outside of which headings are reflected.
    pub bounds: GeoBox,
    /// Full width of the course correction in degrees.
    pub jitter_deg: f64,
}

/// Which reflections fired during a step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bounce {
    /// Latitude left the band; heading became `180 − h`.
    pub lat: bool,
    /// Longitude left the band; heading became `360 − h`.
    pub lng: bool,
}

impl Bounce {
    /// Whether either reflection fired.
    pub const fn any(self) -> bool {
        self.lat || self.lng
    }
}

/// Advance `track` by one tick using the uniform draw `u` in `[0, 1)`.
pub fn advance(track: &mut Track, params: &MotionParams, u: f64) -> Bounce {
    let rad = track.heading.to_radians();
    track.position.lat += track.speed * rad.cos();
    track.position.lng += track.speed * rad.sin();

    let mut bounce = Bounce::default();
    if !params.bounds.contains_lat(track.position.lat) {
        track.heading = 180.0 - track.heading;
        bounce.lat = true;
    }
    if !params.bounds.contains_lng(track.position.lng) {
        track.heading = 360.0 - track.heading;
        bounce.lng = true;
    }

    track.heading = normalize_degrees(track.heading);
    track.heading += (u - 0.5) * params.jitter_deg;

    bounce
}
