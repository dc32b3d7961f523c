//! JSON REST API for Matchbook.
//!
//! Exposes an axum [`Router`] backed by any
//! [`matchbook_core::store::MatchStore`]. Auth, TLS, and transport concerns
//! are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", matchbook_api::api_router(store.clone()))
//! ```

pub mod duplicates;
pub mod error;
pub mod matches;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use matchbook_core::store::MatchStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: MatchStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    // Matches
    .route("/matches", get(matches::list::<S>).post(matches::submit::<S>))
    .route("/matches/search", get(matches::search::<S>))
    .route(
      "/matches/require-auto-check",
      post(matches::require_auto_check::<S>),
    )
    .route("/matches/{id}", get(matches::get_one::<S>))
    .route("/matches/{id}/status", post(matches::update_status::<S>))
    .route(
      "/matches/by-external/{external_id}",
      get(matches::get_by_external::<S>),
    )
    // Duplicates
    .route("/duplicates", get(duplicates::list_groups::<S>))
    .route("/duplicates/pending", get(duplicates::pending::<S>))
    .route(
      "/duplicates/{root_id}/resolve",
      post(duplicates::resolve::<S>),
    )
    .route("/duplicates/{root_id}/merge", post(duplicates::merge::<S>))
    .with_state(store)
}
