//! HTTP boundary for the Trophic simulation.
//!
//! This crate provides an Axum HTTP server that exposes the engine's two
//! operations (seed, step) plus a read-only snapshot, and serves a minimal
//! HTML dashboard:
//!
//! - `GET /` -- embedded dashboard (population form, seed/step controls,
//!   grid rendering)
//! - `GET /api/simulation` -- current grid snapshot without advancing
//! - `POST /api/simulation` -- reset and seed the grid from population
//!   counts; `400` if the requested total exceeds grid capacity
//! - `POST /api/simulation/step` -- advance exactly one tick
//!
//! # Architecture
//!
//! The handlers are thin boundary adapters: JSON in, [`GridStore`] call,
//! JSON out. All arbitration (locking, double buffering, validation order)
//! lives in the store; a client aborting a request does not roll back a
//! tick that the store already committed.
//!
//! [`GridStore`]: trophic_core::store::GridStore

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

// Re-export primary types for convenience.
pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerError, start_server};
pub use state::AppState;
