//! JSON wire shapes for the track feed.
//!
//! Every `WebSocket` text frame is an envelope of the form
//! `{"event": <name>, "data": <payload>}`. Event names keep the
//! camelCase spelling radar clients already listen for (`flightData`,
//! `deployAircraft`, `removeAircraft`).

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::ids::TrackId;
use crate::track::Track;

/// One track as it appears in a `flightData` frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightRecord {
    /// Track id.
    pub id: TrackId,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
    /// Heading in degrees.
    pub bearing: f64,
    /// Degrees travelled per tick.
    pub speed: f64,
    /// Whether the track is friendly.
    pub is_friend: bool,
    /// Display classification (`FRIENDLY` or `UNKNOWN/THREAT`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Callsign of a deployed track.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Destination latitude of a deployed track.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_lat: Option<f64>,
    /// Destination longitude of a deployed track.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_lng: Option<f64>,
}

impl From<&Track> for FlightRecord {
    fn from(track: &Track) -> Self {
        Self {
            id: track.id.clone(),
            lat: track.position.lat,
            lng: track.position.lng,
            bearing: track.heading,
            speed: track.speed,
            is_friend: track.affiliation.is_friendly(),
            kind: track.classification().to_owned(),
            name: track.name.clone(),
            target_lat: track.destination.map(|d| d.lat),
            target_lng: track.destination.map(|d| d.lng),
        }
    }
}

/// Request to deploy a new track.
///
/// Every field is optional at the serde layer so that a missing field
/// surfaces as a validation error reported to the caller rather than an
/// opaque parse failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DeployRequest {
    /// Callsign, e.g. `EAGLE-1`.
    #[validate(
        required(message = "name is required"),
        length(min = 1, message = "name must not be empty")
    )]
    pub name: Option<String>,
    /// Source latitude.
    #[validate(
        required(message = "fromLat is required"),
        range(min = -90.0, max = 90.0, message = "fromLat must be within [-90, 90]")
    )]
    pub from_lat: Option<f64>,
    /// Source longitude.
    #[validate(
        required(message = "fromLng is required"),
        range(min = -180.0, max = 180.0, message = "fromLng must be within [-180, 180]")
    )]
    pub from_lng: Option<f64>,
    /// Destination latitude.
    #[validate(
        required(message = "toLat is required"),
        range(min = -90.0, max = 90.0, message = "toLat must be within [-90, 90]")
    )]
    pub to_lat: Option<f64>,
    /// Destination longitude.
    #[validate(
        required(message = "toLng is required"),
        range(min = -180.0, max = 180.0, message = "toLng must be within [-180, 180]")
    )]
    pub to_lng: Option<f64>,
    /// Affiliation flag.
    #[validate(required(message = "isFriend is required"))]
    pub is_friend: Option<bool>,
}

/// Outcome of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AckStatus {
    /// The command was applied.
    Success,
    /// The command was rejected.
    Error,
}

/// Acknowledgment returned to the client that issued a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandAck {
    /// Success or error.
    pub status: AckStatus,
    /// Human-readable outcome.
    pub message: String,
    /// Id of the affected track, when there is one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TrackId>,
}

impl CommandAck {
    /// Build a success acknowledgment.
    pub fn success(message: impl Into<String>, id: Option<TrackId>) -> Self {
        Self {
            status: AckStatus::Success,
            message: message.into(),
            id,
        }
    }

    /// Build an error acknowledgment.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: AckStatus::Error,
            message: message.into(),
            id: None,
        }
    }
}

/// Frames pushed from the server to a subscriber.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Full track picture.
    FlightData(Vec<FlightRecord>),
    /// Result of a command sent by this subscriber.
    CommandResult(CommandAck),
}

/// Frames a subscriber may send to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Deploy a new track.
    DeployAircraft(DeployRequest),
    /// Remove a track by id.
    RemoveAircraft(TrackId),
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]

    use super::*;
    use crate::track::{Affiliation, Position};

    #[test]
    fn flight_record_uses_feed_field_names() {
        let track = Track {
            id: TrackId::new("FLT-1000"),
            position: Position::new(20.0, 78.0),
            heading: 90.0,
            speed: 0.05,
            affiliation: Affiliation::Hostile,
            name: None,
            destination: None,
        };
        let json = serde_json::to_value(FlightRecord::from(&track)).unwrap();
        assert_eq!(json["id"], "FLT-1000");
        assert_eq!(json["isFriend"], false);
        assert_eq!(json["type"], "UNKNOWN/THREAT");
        assert!(json.get("name").is_none());
        assert!(json.get("targetLat").is_none());
    }

    #[test]
    fn client_messages_parse_from_envelopes() {
        let remove: ClientMessage =
            serde_json::from_str(r#"{"event":"removeAircraft","data":"FLT-1003"}"#).unwrap();
        assert_eq!(remove, ClientMessage::RemoveAircraft(TrackId::new("FLT-1003")));

        let deploy: ClientMessage = serde_json::from_str(
            r#"{"event":"deployAircraft","data":{"name":"EAGLE-1","fromLat":20.0,"fromLng":77.0,"toLat":25.0,"toLng":80.0,"isFriend":true}}"#,
        )
        .unwrap();
        match deploy {
            ClientMessage::DeployAircraft(req) => {
                assert_eq!(req.name.as_deref(), Some("EAGLE-1"));
                assert_eq!(req.is_friend, Some(true));
            }
            ClientMessage::RemoveAircraft(_) => panic!("expected deploy"),
        }
    }

    #[test]
    fn deploy_request_reports_missing_fields() {
        let req = DeployRequest {
            name: Some("VIPER-7".to_owned()),
            from_lat: Some(20.0),
            ..DeployRequest::default()
        };
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        // fromLng, toLat, toLng, isFriend
        assert_eq!(fields.len(), 4);
        assert!(!fields.contains_key("name"));
    }

    #[test]
    fn deploy_request_rejects_out_of_range_latitude() {
        let req = DeployRequest {
            name: Some("VIPER-7".to_owned()),
            from_lat: Some(120.0),
            from_lng: Some(77.0),
            to_lat: Some(25.0),
            to_lng: Some(80.0),
            is_friend: Some(false),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn server_message_envelope() {
        let msg = ServerMessage::CommandResult(CommandAck::success("ok", None));
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["event"], "commandResult");
        assert_eq!(json["data"]["status"], "success");
    }
}
