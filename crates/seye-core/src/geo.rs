//! Spherical geometry helpers.
//!
//! Degrees in, degrees (or kilometres) out. The earth is a sphere of
//! radius [`EARTH_RADIUS_KM`]; nothing here needs ellipsoid accuracy.

use seye_types::Position;

/// Mean earth radius used by [`haversine_km`].
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Fold any angle into `[0, 360)`.
///
/// `rem_euclid` can round a tiny negative input up to exactly `360.0`,
/// which is folded back to `0.0`.
pub fn normalize_degrees(degrees: f64) -> f64 {
    let folded = degrees.rem_euclid(360.0);
    if folded >= 360.0 { 0.0 } else { folded }
}

/// Initial great-circle bearing from `from` towards `to`, in `[0, 360)`.
pub fn initial_bearing(from: Position, to: Position) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let d_lng = (to.lng - from.lng).to_radians();

    let y = d_lng.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lng.cos();

    normalize_degrees(y.atan2(x).to_degrees())
}

/// Great-circle distance between two positions in kilometres.
pub fn haversine_km(from: Position, to: Position) -> f64 {
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lng = (to.lng - from.lng).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + from.lat.to_radians().cos() * to.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}
