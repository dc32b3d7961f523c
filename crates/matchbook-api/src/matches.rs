//! Handlers for `/matches` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/matches` | Paged; `?verified_only=false` includes ineligible matches |
//! | `POST` | `/matches` | Submit external ids for a tournament |
//! | `GET`  | `/matches/search?name=` | Eligible-match name search |
//! | `POST` | `/matches/require-auto-check` | Bulk re-check flag |
//! | `GET`  | `/matches/:id` | Match with games and scores; 404 if missing |
//! | `POST` | `/matches/:id/status` | Update verification status |
//! | `GET`  | `/matches/by-external/:external_id` | Lookup by source-platform id |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use matchbook_core::{
  matches::{Match, MatchDetail, VerificationSource, VerificationStatus},
  store::MatchStore,
};
use matchbook_pipeline::submission::{submit_matches, MatchSubmission};
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;

// ─── List ─────────────────────────────────────────────────────────────────────

fn default_limit() -> u32 { 100 }
fn default_true() -> bool { true }

#[derive(Debug, Deserialize)]
pub struct ListParams {
  #[serde(default = "default_limit")]
  pub limit:         u32,
  #[serde(default)]
  pub page:          u32,
  #[serde(default = "default_true")]
  pub verified_only: bool,
}

/// `GET /matches[?limit=&page=&verified_only=]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Match>>, ApiError>
where
  S: MatchStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let matches = store
    .list_matches(params.limit, params.page, params.verified_only)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(matches))
}

// ─── Submit ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SubmitBody {
  pub tournament_id: Option<i64>,
  pub submitter_id:  i64,
  pub external_ids:  Vec<i64>,
  #[serde(default)]
  pub verify:        bool,
}

/// `POST /matches` — returns 201 + the records actually created.
pub async fn submit<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<SubmitBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: MatchStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  if body.external_ids.is_empty() {
    return Err(ApiError::BadRequest("no match ids submitted".into()));
  }

  let created = submit_matches(store.as_ref(), MatchSubmission {
    tournament_id: body.tournament_id,
    submitter_id:  body.submitter_id,
    external_ids:  body.external_ids,
    verify:        body.verify,
  })
  .await?;

  Ok((StatusCode::CREATED, Json(created)))
}

// ─── Search ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SearchParams {
  pub name: String,
}

/// `GET /matches/search?name=<fragment>`
pub async fn search<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Match>>, ApiError>
where
  S: MatchStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let matches = store
    .search_matches(&params.name)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(matches))
}

// ─── Require auto-check ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RequireAutoCheckParams {
  #[serde(default = "default_true")]
  pub invalid_only: bool,
}

/// `POST /matches/require-auto-check[?invalid_only=false]`
pub async fn require_auto_check<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<RequireAutoCheckParams>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: MatchStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let affected = store
    .set_require_auto_check(params.invalid_only)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  tracing::info!(
    invalid_only = params.invalid_only,
    affected,
    "flagged matches for auto-check"
  );
  Ok(Json(json!({ "affected": affected })))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /matches/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<MatchDetail>, ApiError>
where
  S: MatchStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let detail = store
    .get_match_detail(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("match {id} not found")))?;
  Ok(Json(detail))
}

/// `GET /matches/by-external/:external_id`
pub async fn get_by_external<S>(
  State(store): State<Arc<S>>,
  Path(external_id): Path<i64>,
) -> Result<Json<Match>, ApiError>
where
  S: MatchStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let record = store
    .get_match_by_external_id(external_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| {
      ApiError::NotFound(format!("no match with external id {external_id}"))
    })?;
  Ok(Json(record))
}

// ─── Update status ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UpdateStatusBody {
  pub status:      VerificationStatus,
  pub source:      VerificationSource,
  pub info:        Option<String>,
  pub verifier_id: Option<i64>,
}

/// `POST /matches/:id/status` — body: [`UpdateStatusBody`].
pub async fn update_status<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
  Json(body): Json<UpdateStatusBody>,
) -> Result<Json<Match>, ApiError>
where
  S: MatchStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let updated = store
    .update_verification_status(
      id,
      body.status,
      body.source,
      body.info.clone(),
      body.verifier_id,
    )
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("match {id} not found")))?;

  tracing::info!(
    match_id = id,
    status = ?body.status,
    source = ?body.source,
    info = ?body.info,
    "updated verification status"
  );
  Ok(Json(updated))
}
