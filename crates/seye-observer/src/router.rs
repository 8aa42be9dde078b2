//! Axum router construction for the track feed server.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS middleware enabled for cross-origin dashboard access.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router.
///
/// The router includes:
/// - `GET /` -- minimal HTML status page
/// - `GET /ws`, `GET /socket` -- `WebSocket` track feed
/// - `GET|POST /api/tracks` -- list or deploy tracks
/// - `GET|DELETE /api/tracks/{id}` -- read or remove one track
/// - `GET /api/analyze` -- simulated target classification
/// - `POST /api/generate-aircraft-params` -- simulated flight plan
///
/// CORS allows any origin; the map client is served separately.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status page
        .route("/", get(handlers::index))
        // WebSocket
        .route("/ws", get(ws::ws_feed))
        .route("/socket", get(ws::ws_feed))
        // Tracks
        .route(
            "/api/tracks",
            get(handlers::list_tracks).post(handlers::deploy_track),
        )
        .route(
            "/api/tracks/{id}",
            get(handlers::get_track).delete(handlers::remove_track),
        )
        // Intel
        .route("/api/analyze", get(handlers::analyze))
        .route(
            "/api/generate-aircraft-params",
            post(handlers::generate_params),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
