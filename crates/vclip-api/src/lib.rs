//! Axum HTTP API server.
//!
//! Exposes job submission and polling over HTTP, fronted by a shared
//! `X-API-Key` secret, per-IP rate limiting, and Prometheus metrics. All
//! pipeline work happens out of process, in the Worker; this crate only
//! talks to the Registry and remote storage.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
