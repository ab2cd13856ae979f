//! Axum router construction for the Trophic API.
//!
//! Assembles the dashboard and REST routes into a single [`Router`] with
//! CORS middleware enabled for cross-origin dashboard access.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router for the Trophic server.
///
/// The router includes:
/// - `GET /` -- embedded HTML dashboard
/// - `GET /api/simulation` -- current grid snapshot
/// - `POST /api/simulation` -- reset and seed the grid
/// - `POST /api/simulation/step` -- advance one tick
///
/// CORS is configured to allow any origin for development. In production
/// this should be restricted.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Dashboard
        .route("/", get(handlers::index))
        // REST API
        .route(
            "/api/simulation",
            get(handlers::get_simulation).post(handlers::seed_simulation),
        )
        .route("/api/simulation/step", post(handlers::step_simulation))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
