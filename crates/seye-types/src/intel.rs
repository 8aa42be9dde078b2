//! Payloads of the stateless analysis endpoints.
//!
//! Neither endpoint touches the track store; these types only exist so
//! the handlers and their tests agree on field names.

use serde::{Deserialize, Serialize};

/// Normalized bounding box of a detected target within an image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge, fraction of image width.
    pub left: f64,
    /// Top edge, fraction of image height.
    pub top: f64,
    /// Width, fraction of image width.
    pub width: f64,
    /// Height, fraction of image height.
    pub height: f64,
}

/// Simulated image classification result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// Detected airframe label.
    pub tag_name: String,
    /// Confidence percentage formatted with two decimals.
    pub probability: String,
    /// Where the target sits in the frame.
    pub bounding_box: BoundingBox,
}

/// Fabricated flight parameters for a planned deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AircraftParams {
    /// Airframe type.
    pub aircraft_type: String,
    /// Cruise altitude, e.g. `32000 ft`.
    pub altitude: String,
    /// Cruise velocity, e.g. `950 km/h`.
    pub velocity: String,
    /// Fuel on board, e.g. `87%`.
    pub fuel_level: String,
    /// Weapon state.
    pub weapon_status: String,
    /// Time to destination, e.g. `42 min`.
    pub eta: String,
    /// Great-circle distance from source to destination in kilometres.
    pub distance_km: f64,
    /// Initial bearing from source to destination in degrees.
    pub bearing: f64,
}
