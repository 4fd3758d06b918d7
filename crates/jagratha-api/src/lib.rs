//! JSON REST API for Jagratha.
//!
//! Exposes an axum [`Router`] backed by any
//! [`jagratha_core::monitor::AssetMonitor`]. The adapter only translates
//! HTTP to monitor calls; auth, TLS and transport concerns are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", jagratha_api::api_router(engine.clone()))
//! ```

pub mod alerts;
pub mod assets;
pub mod error;
pub mod observations;
pub mod reports;
pub mod summary;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use jagratha_core::monitor::AssetMonitor;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Build a fully-materialised API router for `monitor`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(monitor: Arc<S>) -> Router<()>
where
  S: AssetMonitor + 'static,
{
  Router::new()
    // Assets
    .route("/tree", get(assets::tree::<S>))
    .route("/assets/{id}", get(assets::get_one::<S>))
    .route("/summary", get(summary::handler::<S>))
    // Alerts
    .route("/alerts", get(alerts::list::<S>))
    .route("/alerts/stream", get(alerts::stream::<S>))
    .route("/alerts/{id}/resolve", post(alerts::resolve_one::<S>))
    // Inputs
    .route("/reports", post(reports::create::<S>))
    .route("/observations", post(observations::apply::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(monitor)
}
