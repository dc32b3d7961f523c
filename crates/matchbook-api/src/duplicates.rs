//! Handlers for `/duplicates` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/duplicates` | Run the detector; groups tagged by rule |
//! | `GET`  | `/duplicates/pending` | Unresolved ledger entries for review |
//! | `POST` | `/duplicates/:root_id/resolve` | Record verdict; merge on confirm |
//! | `POST` | `/duplicates/:root_id/merge` | Merge already-confirmed duplicates (retry path) |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use matchbook_core::store::MatchStore;
use matchbook_pipeline::{
  detector::{detect_duplicate_groups, DuplicateGroup},
  merge::{merge_duplicates, MergeOutcome},
  workflow::{duplicate_collections, resolve_duplicate_verdict, DuplicateCollection},
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

// ─── Detector ─────────────────────────────────────────────────────────────────

/// `GET /duplicates`
pub async fn list_groups<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<DuplicateGroup>>, ApiError>
where
  S: MatchStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let groups = detect_duplicate_groups(store.as_ref()).await?;
  Ok(Json(groups))
}

// ─── Pending review ───────────────────────────────────────────────────────────

/// `GET /duplicates/pending`
pub async fn pending<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<DuplicateCollection>>, ApiError>
where
  S: MatchStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let collections = duplicate_collections(store.as_ref()).await?;
  Ok(Json(collections))
}

// ─── Resolve ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ResolveBody {
  pub verifier_id: i64,
  pub confirmed:   bool,
}

#[derive(Debug, Serialize)]
pub struct ResolveResult {
  /// Present when the verdict was a confirmation and the merge ran.
  pub merged: Option<MergeOutcome>,
}

/// `POST /duplicates/:root_id/resolve` — body: `{"verifier_id":…,"confirmed":…}`
pub async fn resolve<S>(
  State(store): State<Arc<S>>,
  Path(root_id): Path<i64>,
  Json(body): Json<ResolveBody>,
) -> Result<Json<ResolveResult>, ApiError>
where
  S: MatchStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let merged = resolve_duplicate_verdict(
    store.as_ref(),
    root_id,
    body.verifier_id,
    body.confirmed,
  )
  .await?;

  Ok(Json(ResolveResult { merged }))
}

// ─── Merge (retry) ────────────────────────────────────────────────────────────

/// `POST /duplicates/:root_id/merge` — re-run the merge for a root whose
/// links are already confirmed, e.g. after an earlier attempt failed.
pub async fn merge<S>(
  State(store): State<Arc<S>>,
  Path(root_id): Path<i64>,
) -> Result<Json<MergeOutcome>, ApiError>
where
  S: MatchStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let outcome = merge_duplicates(store.as_ref(), root_id).await?;
  Ok(Json(outcome))
}
