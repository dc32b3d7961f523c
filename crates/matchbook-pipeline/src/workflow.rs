//! Verification Workflow Orchestrator — the single entry point a
//! human-facing operation calls to resolve a duplicate candidate group.

use std::collections::BTreeMap;

use matchbook_core::{
  duplicates::{DuplicateLink, DuplicateVerdict},
  store::MatchStore,
  Error as DomainError,
};
use serde::Serialize;

use crate::{
  merge::{merge_duplicates, MergeOutcome},
  Error, Result,
};

/// Record a verdict on every ledger link pointing at `root_id`, then — iff
/// the verdict is a confirmation — merge the duplicates onto the root.
///
/// The verdict write always completes before the merge starts, and it is
/// not rolled back if the merge fails: the recorded verdict is
/// authoritative, and a failed merge is retried or corrected manually.
/// Returns the merge summary when a merge ran, `None` on denial.
pub async fn resolve_duplicate_verdict<S: MatchStore>(
  store:       &S,
  root_id:     i64,
  verifier_id: i64,
  confirmed:   bool,
) -> Result<Option<MergeOutcome>> {
  let updated = store
    .record_duplicate_verdict(root_id, verifier_id, confirmed)
    .await
    .map_err(Error::store)?;

  tracing::info!(
    root = root_id,
    verifier = verifier_id,
    confirmed,
    links = updated,
    "recorded duplicate verdict"
  );

  if !confirmed {
    return Ok(None);
  }

  merge_duplicates(store, root_id).await.map(Some)
}

// ─── Pending review listing ──────────────────────────────────────────────────

/// One suspected duplicate of a root, for human review.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateSuspect {
  pub external_id: i64,
  pub name:        Option<String>,
  pub verified_by: Option<i64>,
  pub verdict:     DuplicateVerdict,
}

/// A root match with its unresolved suspected duplicates.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateCollection {
  pub root_id:          i64,
  pub root_external_id: i64,
  pub name:             Option<String>,
  pub suspects:         Vec<DuplicateSuspect>,
}

/// Group all unresolved ledger links by suspected root and materialise each
/// root plus its suspects. Links that resolve to the root itself, or to no
/// surviving match, are skipped.
pub async fn duplicate_collections<S: MatchStore>(
  store: &S,
) -> Result<Vec<DuplicateCollection>> {
  let links = store.unresolved_links().await.map_err(Error::store)?;

  let mut by_root: BTreeMap<i64, Vec<DuplicateLink>> = BTreeMap::new();
  for link in links {
    by_root.entry(link.suspected_root_id).or_default().push(link);
  }

  let mut collections = Vec::with_capacity(by_root.len());
  for (root_id, group) in by_root {
    let root = store
      .get_match(root_id)
      .await
      .map_err(Error::store)?
      .ok_or(DomainError::MatchNotFound(root_id))?;

    let mut suspects = Vec::new();
    for link in group {
      let candidates = store
        .get_matches_by_external_ids(vec![link.external_match_id])
        .await
        .map_err(Error::store)?;
      for suspect in candidates {
        if suspect.id == root.id {
          continue;
        }
        suspects.push(DuplicateSuspect {
          external_id: suspect.external_id,
          name:        suspect.name,
          verified_by: link.verified_by,
          verdict:     link.verdict,
        });
      }
    }

    collections.push(DuplicateCollection {
      root_id:          root.id,
      root_external_id: root.external_id,
      name:             root.name,
      suspects,
    });
  }

  Ok(collections)
}
