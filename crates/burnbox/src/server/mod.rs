//! Axum HTTP server, routing, and middleware.
//!
//! # Responsibilities
//! - Define the JSON API routes and their status-code contract.
//! - Parse request bodies leniently so every input violation answers `400`
//!   with a uniform error body.
//! - Inject shared application state (`AppState`) into handlers.

pub mod handlers;
pub mod router;
pub mod state;
