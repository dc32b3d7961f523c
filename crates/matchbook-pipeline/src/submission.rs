//! Match submission — ingesting user-submitted external match ids.

use std::collections::HashSet;

use matchbook_core::{
  matches::{Match, NewMatch},
  store::MatchStore,
};

use crate::{Error, Result};

/// A user submission of one or more external match ids for a tournament.
#[derive(Debug, Clone)]
pub struct MatchSubmission {
  pub tournament_id: Option<i64>,
  pub submitter_id:  i64,
  pub external_ids:  Vec<i64>,
  /// Submitter is trusted; created matches start `PreVerified`.
  pub verify:        bool,
}

/// Create a match record for every submitted external id not already
/// present in the store. Repeated ids within one submission are collapsed.
/// Returns the records actually created.
pub async fn submit_matches<S: MatchStore>(
  store:      &S,
  submission: MatchSubmission,
) -> Result<Vec<Match>> {
  let existing: HashSet<i64> = store
    .get_matches_by_external_ids(submission.external_ids.clone())
    .await
    .map_err(Error::store)?
    .into_iter()
    .map(|m| m.external_id)
    .collect();

  let mut seen = existing;
  let mut created = Vec::new();
  for external_id in submission.external_ids {
    if !seen.insert(external_id) {
      continue;
    }
    let record = store
      .create_match(NewMatch::submitted(
        submission.tournament_id,
        external_id,
        submission.submitter_id,
        submission.verify,
      ))
      .await
      .map_err(Error::store)?;
    created.push(record);
  }

  tracing::info!(
    tournament = ?submission.tournament_id,
    submitter = submission.submitter_id,
    created = created.len(),
    "ingested match submission"
  );

  Ok(created)
}
