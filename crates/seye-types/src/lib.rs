//! Shared type definitions for the S-EYE track feed.
//!
//! This crate is the single source of truth for the types that cross
//! crate boundaries: the simulated [`Track`], the immutable
//! [`TrackSnapshot`] handed to the broadcast path, and the JSON wire
//! shapes exchanged with `WebSocket` and REST clients.
//!
//! # Modules
//!
//! - [`ids`] -- Strongly-typed identifiers for tracks and subscribers
//! - [`track`] -- Track, position, affiliation, and snapshot types
//! - [`wire`] -- Feed frames, client commands, and acknowledgments
//! - [`intel`] -- Payloads of the stateless analysis endpoints

pub mod ids;
pub mod intel;
pub mod track;
pub mod wire;

// Re-export all public types at crate root for convenience.
pub use ids::{SubscriberId, TrackId};
pub use intel::{AircraftParams, AnalysisReport, BoundingBox};
pub use track::{Affiliation, Position, Track, TrackSnapshot};
pub use wire::{AckStatus, ClientMessage, CommandAck, DeployRequest, FlightRecord, ServerMessage};
