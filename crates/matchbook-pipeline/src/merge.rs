//! Merge Engine — folds confirmed duplicates into their root match.
//!
//! Every precondition is validated before the first mutation; any violation
//! aborts the whole operation with a typed error and no visible effect.
//! The merge itself runs duplicate-by-duplicate: reassign the duplicate's
//! games to the root (durable once the call returns), then delete the empty
//! duplicate shell. A crash between the two steps leaves games correctly
//! parented and an empty shell that the idempotent delete removes on retry.

use std::collections::HashSet;

use matchbook_core::{matches::Match, store::MatchStore, Error as DomainError};
use serde::Serialize;

use crate::{Error, Result};

/// One duplicate folded into the root.
#[derive(Debug, Clone, Serialize)]
pub struct MergedDuplicate {
  pub match_id:    i64,
  pub external_id: i64,
  pub games_moved: u64,
}

/// Summary of a completed merge.
#[derive(Debug, Clone, Serialize)]
pub struct MergeOutcome {
  pub root_id: i64,
  pub merged:  Vec<MergedDuplicate>,
}

/// Merge every confirmed duplicate of `root_id` onto it.
///
/// Duplicates are resolved from the ledger's confirmed links by external
/// id; a link that no longer resolves to a surviving match — or that
/// resolves to the root itself — is skipped. The duplicates' ledger rows
/// are left untouched as the permanent record of what was merged.
pub async fn merge_duplicates<S: MatchStore>(
  store:   &S,
  root_id: i64,
) -> Result<MergeOutcome> {
  let root = store
    .get_match(root_id)
    .await
    .map_err(Error::store)?
    .ok_or(DomainError::MatchNotFound(root_id))?;

  if !root.is_processed {
    return Err(DomainError::RootNotProcessed(root_id).into());
  }

  let games = store.games_for_match(root_id).await.map_err(Error::store)?;
  if games.is_empty() {
    return Err(DomainError::RootHasNoGames(root_id).into());
  }

  let scores = store.scores_for_match(root_id).await.map_err(Error::store)?;
  if scores.is_empty() {
    return Err(DomainError::RootHasNoScores(root_id).into());
  }

  let links = store
    .confirmed_links_for_root(root_id)
    .await
    .map_err(Error::store)?;
  if links.is_empty() {
    return Err(DomainError::NoConfirmedDuplicates(root_id).into());
  }

  // A link is resolved to every surviving match bearing its external id,
  // except the root itself (root and duplicate may share an external id).
  // A link resolving to nothing has already been merged away; skipping it
  // is what makes a retried merge self-healing.
  let mut duplicates: Vec<Match> = Vec::new();
  let mut seen = HashSet::new();
  for link in &links {
    let candidates = store
      .get_matches_by_external_ids(vec![link.external_match_id])
      .await
      .map_err(Error::store)?;
    for m in candidates {
      if m.id == root.id || !seen.insert(m.id) {
        continue;
      }
      duplicates.push(m);
    }
  }

  // Validate the whole set before touching anything.
  for duplicate in &duplicates {
    if duplicate.tournament_id != root.tournament_id {
      return Err(
        DomainError::TournamentMismatch {
          root:      root.id,
          duplicate: duplicate.id,
        }
        .into(),
      );
    }
    if !duplicate.is_processed {
      return Err(DomainError::DuplicateNotProcessed(duplicate.id).into());
    }

    let name_matches = duplicate.name == root.name;
    let id_matches = duplicate.external_id == root.external_id;
    if !name_matches && !id_matches {
      return Err(
        DomainError::DuplicateMismatch {
          root:      root.id,
          duplicate: duplicate.id,
        }
        .into(),
      );
    }
  }

  let mut merged = Vec::with_capacity(duplicates.len());
  for duplicate in &duplicates {
    // Step 1: reparent. Durable before the shell is deleted, so a failure
    // here or between the steps never strands game or score data.
    let games_moved = store
      .reassign_games(duplicate.id, root.id)
      .await
      .map_err(Error::store)?;

    // Step 2: drop the empty shell. The ledger row survives so "match Y
    // was merged into root X" stays answerable forever.
    store.delete_match(duplicate.id).await.map_err(Error::store)?;

    tracing::info!(
      duplicate = duplicate.id,
      root = root.id,
      games_moved,
      "reparented games and removed duplicate match shell"
    );

    merged.push(MergedDuplicate {
      match_id: duplicate.id,
      external_id: duplicate.external_id,
      games_moved,
    });
  }

  Ok(MergeOutcome { root_id: root.id, merged })
}
