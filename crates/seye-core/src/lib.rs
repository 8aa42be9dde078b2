//! Track store, motion model, simulation clock, and command handling for
//! the S-EYE track feed.
//!
//! This crate owns all mutable simulation state and knows nothing about
//! transports. Fan-out is reached through the [`Broadcaster`] trait,
//! which the observer crate implements.
//!
//! # Modules
//!
//! - [`clock`] -- Fixed-period tick driver (`Idle` -> `Running`).
//! - [`command`] -- Deploy and remove commands with validation.
//! - [`config`] -- Configuration loading from `seye-config.yaml` into
//!   strongly-typed structs.
//! - [`geo`] -- Great-circle bearing and haversine distance.
//! - [`motion`] -- Pure per-track motion model with boundary bounce.
//! - [`publish`] -- The [`Broadcaster`] seam and [`BroadcastReport`].
//! - [`store`] -- The canonical [`TrackStore`] and its shared handle.
//!
//! [`Broadcaster`]: publish::Broadcaster
//! [`BroadcastReport`]: publish::BroadcastReport
//! [`TrackStore`]: store::TrackStore

pub mod clock;
pub mod command;
pub mod config;
pub mod geo;
pub mod motion;
pub mod publish;
pub mod store;

pub use clock::{ClockError, ClockState, ClockSummary, SimulationClock};
pub use command::{CommandError, CommandHandler};
pub use config::{ConfigError, SeyeConfig};
pub use publish::{BroadcastReport, Broadcaster};
pub use store::{SharedTrackStore, StoreError, TrackStore};
