//! Track feed server for the S-EYE simulation.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **`WebSocket` feed** (`/ws`, alias `/socket`) that pushes the full
//!   track picture on connect, every tick, and after every command, and
//!   accepts `deployAircraft` / `removeAircraft` commands
//! - **REST endpoints** for reading and editing the track picture
//! - **Intel endpoints** producing simulated target analysis and flight
//!   parameters
//! - **Minimal HTML status page** (`GET /`)
//!
//! # Architecture
//!
//! Every connection is a subscriber in the [`SubscriberRegistry`] with a
//! bounded frame queue. The [`BroadcastEngine`] serializes each snapshot
//! once and pushes it into every queue without blocking; the connection
//! task drains its own queue into the socket. Snapshots are published
//! under the store lock, so all subscribers see frames in store order.
//!
//! [`SubscriberRegistry`]: registry::SubscriberRegistry
//! [`BroadcastEngine`]: broadcast::BroadcastEngine

pub mod broadcast;
pub mod error;
pub mod handlers;
pub mod intel;
pub mod registry;
pub mod router;
pub mod server;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use broadcast::{BroadcastEngine, BroadcastError};
pub use error::ObserverError;
pub use registry::{DeliveryError, SubscriberRegistry, Subscription};
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use state::AppState;
