//! REST endpoint handlers for the track feed server.
//!
//! Track reads take the store lock only long enough to copy a snapshot.
//! Writes go through the same [`CommandHandler`] as `WebSocket` commands,
//! so a REST deploy is broadcast to every subscriber like any other.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/api/tracks` | Current track picture |
//! | `POST` | `/api/tracks` | Deploy a track |
//! | `GET` | `/api/tracks/{id}` | Single track |
//! | `DELETE` | `/api/tracks/{id}` | Remove a track |
//! | `GET` | `/api/analyze` | Simulated target classification |
//! | `POST` | `/api/generate-aircraft-params` | Simulated flight plan |
//!
//! [`CommandHandler`]: seye_core::command::CommandHandler

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse};
use chrono::Utc;
use seye_core::command::DeployOrder;
use seye_types::{DeployRequest, FlightRecord, TrackId};
use serde::Serialize;
use tracing::debug;

use crate::error::ObserverError;
use crate::intel;
use crate::state::AppState;

/// Body of `GET /api/tracks`.
#[derive(Debug, Serialize)]
pub struct TrackListResponse {
    /// Ticks completed when the picture was taken.
    pub tick: u64,
    /// Number of tracks.
    pub count: usize,
    /// The tracks, in insertion order.
    pub tracks: Vec<FlightRecord>,
}

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page showing feed status and API links.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (tick, tracks) = {
        let store = state.store.lock().await;
        (store.tick(), store.len())
    };
    let subscribers = state.registry.len();
    let uptime = Utc::now()
        .signed_duration_since(state.started_at)
        .num_seconds();

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>S-EYE Track Feed</title>
    <style>
        body {{
            background: #0b0f0c;
            color: #b8d8be;
            font-family: 'Cascadia Code', 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }}
        h1 {{ color: #3fb950; margin-bottom: 0.25rem; }}
        .subtitle {{ color: #6e7f72; margin-top: 0; }}
        .metric {{
            display: inline-block;
            background: #121a14;
            border: 1px solid #243028;
            border-radius: 6px;
            padding: 1rem 1.5rem;
            margin: 0.5rem 0.5rem 0.5rem 0;
            min-width: 120px;
        }}
        .metric .label {{ color: #6e7f72; font-size: 0.85rem; }}
        .metric .value {{ color: #3fb950; font-size: 1.5rem; font-weight: bold; }}
        a {{ color: #3fb950; text-decoration: none; }}
        ul {{ list-style: none; padding: 0; }}
        li {{ padding: 0.3rem 0; }}
        code {{ color: #7ee787; }}
    </style>
</head>
<body>
    <h1>S-EYE Track Feed</h1>
    <p class="subtitle">Simulated air picture broadcast</p>

    <div>
        <div class="metric">
            <div class="label">Tick</div>
            <div class="value">{tick}</div>
        </div>
        <div class="metric">
            <div class="label">Tracks</div>
            <div class="value">{tracks}</div>
        </div>
        <div class="metric">
            <div class="label">Subscribers</div>
            <div class="value">{subscribers}</div>
        </div>
        <div class="metric">
            <div class="label">Uptime (s)</div>
            <div class="value">{uptime}</div>
        </div>
    </div>

    <h3>Endpoints</h3>
    <ul>
        <li><code>WS</code> <a href="/ws">/ws</a></li>
        <li><code>GET</code> <a href="/api/tracks">/api/tracks</a></li>
        <li><code>POST</code> /api/tracks</li>
        <li><code>DELETE</code> /api/tracks/{{id}}</li>
        <li><code>GET</code> <a href="/api/analyze">/api/analyze</a></li>
        <li><code>POST</code> /api/generate-aircraft-params</li>
    </ul>
</body>
</html>"#
    ))
}

// ---------------------------------------------------------------------------
// Tracks
// ---------------------------------------------------------------------------

/// List the current track picture.
///
/// # Route
///
/// `GET /api/tracks`
pub async fn list_tracks(State(state): State<Arc<AppState>>) -> Json<TrackListResponse> {
    let snapshot = state.store.lock().await.snapshot();
    let tracks: Vec<FlightRecord> = snapshot.tracks.iter().map(FlightRecord::from).collect();
    Json(TrackListResponse {
        tick: snapshot.tick,
        count: tracks.len(),
        tracks,
    })
}

/// Get a single track.
///
/// # Route
///
/// `GET /api/tracks/{id}`
///
/// # Errors
///
/// Returns [`ObserverError::NotFound`] if no track has this id.
pub async fn get_track(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<FlightRecord>, ObserverError> {
    let id = TrackId::new(id);
    let store = state.store.lock().await;
    store
        .get(&id)
        .map(|track| Json(FlightRecord::from(track)))
        .ok_or_else(|| ObserverError::NotFound(format!("track {id} not found")))
}

/// Deploy a track.
///
/// # Route
///
/// `POST /api/tracks`
///
/// # Errors
///
/// Returns [`ObserverError::Validation`] for a malformed body and
/// [`ObserverError::Conflict`] if the generated id is already live.
pub async fn deploy_track(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DeployRequest>,
) -> Result<impl IntoResponse, ObserverError> {
    let ack = state.commands.deploy(request).await?;
    Ok(Json(ack))
}

/// Remove a track. Removing an absent id is not an error.
///
/// # Route
///
/// `DELETE /api/tracks/{id}`
pub async fn remove_track(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    Json(state.commands.retract(&TrackId::new(id)).await)
}

// ---------------------------------------------------------------------------
// Intel
// ---------------------------------------------------------------------------

/// Simulated classification of the selected target, after a fixed delay.
///
/// # Route
///
/// `GET /api/analyze`
pub async fn analyze(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    tokio::time::sleep(state.analyze_delay).await;
    let report = intel::analyze(&mut rand::rng());
    debug!(tag = %report.tag_name, probability = %report.probability, "Target analyzed");
    Json(report)
}

/// Fabricated flight parameters for a planned deployment.
///
/// # Route
///
/// `POST /api/generate-aircraft-params`
///
/// # Errors
///
/// Returns [`ObserverError::Validation`] for a malformed body.
pub async fn generate_params(
    Json(request): Json<DeployRequest>,
) -> Result<impl IntoResponse, ObserverError> {
    let order = DeployOrder::try_from(request)?;
    let params = intel::aircraft_params(&order, &mut rand::rng());
    Ok(Json(params))
}
