//! The duplicate link ledger.
//!
//! A link records "this external match id is suspected to be a duplicate of
//! root match X" plus the eventual human verdict. Links are never deleted,
//! even after a successful merge; they are the permanent audit trail of what
//! was merged into what.

use serde::{Deserialize, Serialize};

/// Tri-state outcome of human review of a suspected duplicate.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateVerdict {
  #[default]
  Unknown,
  Confirmed,
  Denied,
}

impl DuplicateVerdict {
  pub fn is_resolved(self) -> bool { !matches!(self, Self::Unknown) }
}

/// One ledger row. `suspected_root_id` is the *internal* id of the root;
/// `external_match_id` identifies the suspect by its source-platform id,
/// because the suspect row itself is deleted once a merge succeeds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateLink {
  pub id:                i64,
  pub external_match_id: i64,
  pub suspected_root_id: i64,
  pub verified_by:       Option<i64>,
  pub verdict:           DuplicateVerdict,
}

/// Input to [`crate::store::MatchStore::add_duplicate_link`].
/// New links always start with an [`DuplicateVerdict::Unknown`] verdict.
#[derive(Debug, Clone)]
pub struct NewDuplicateLink {
  pub external_match_id: i64,
  pub suspected_root_id: i64,
}
