//! Match — one real-world multiplayer lobby submission.
//!
//! A match is created from nothing but a user-submitted external id; names,
//! timestamps, games and scores arrive later when the external fetch worker
//! marks the record processed. Duplicate submissions of the same lobby are
//! expected and resolved by the dedup pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::games::GameWithScores;

// ─── Verification state machine ──────────────────────────────────────────────

/// Lifecycle status of a match.
///
/// `PendingVerification → {Verified, Rejected}`, with `PreVerified` as the
/// alternate initial state for matches submitted already trusted. No status
/// is immutable; only merge deletion removes a match for good.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
  PendingVerification,
  PreVerified,
  Verified,
  Rejected,
}

impl VerificationStatus {
  /// Status assigned at submission time.
  pub fn initial(pre_verified: bool) -> Self {
    if pre_verified {
      Self::PreVerified
    } else {
      Self::PendingVerification
    }
  }

  /// `Verified` and `PreVerified` are the only statuses that can feed
  /// rating computation.
  pub fn is_trusted(self) -> bool {
    matches!(self, Self::Verified | Self::PreVerified)
  }
}

/// Who (or what) rendered the current verification status.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum VerificationSource {
  Human,
  System,
  #[default]
  Unknown,
}

// ─── Match ───────────────────────────────────────────────────────────────────

/// A stored match record. The internal `id` is assigned by the store and is
/// stable for the record's lifetime; `external_id` comes from the source
/// platform and is NOT unique across submissions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
  pub id:               i64,
  pub external_id:      i64,
  pub name:             Option<String>,
  pub tournament_id:    Option<i64>,
  pub start_time:       Option<DateTime<Utc>>,
  pub end_time:         Option<DateTime<Utc>>,
  pub status:           VerificationStatus,
  pub source:           VerificationSource,
  /// Free-text context recorded alongside a status update.
  pub info:             Option<String>,
  pub needs_auto_check: bool,
  /// Set once the external fetch worker has populated games/scores.
  pub is_processed:     bool,
  pub submitted_by:     Option<i64>,
  pub verified_by:      Option<i64>,
  pub created_at:       DateTime<Utc>,
  pub updated_at:       Option<DateTime<Utc>>,
}

impl Match {
  /// The rating-eligibility gate: trusted status, externally processed, and
  /// not flagged for re-check. All three must hold simultaneously.
  pub fn is_rating_eligible(&self) -> bool {
    self.status.is_trusted() && self.is_processed && !self.needs_auto_check
  }
}

/// A match together with its games and their scores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchDetail {
  pub record: Match,
  pub games:  Vec<GameWithScores>,
}

// ─── NewMatch ────────────────────────────────────────────────────────────────

/// Input to [`crate::store::MatchStore::create_match`].
/// `id` and `created_at` are always assigned by the store.
#[derive(Debug, Clone)]
pub struct NewMatch {
  pub external_id:      i64,
  pub name:             Option<String>,
  pub tournament_id:    Option<i64>,
  pub start_time:       Option<DateTime<Utc>>,
  pub end_time:         Option<DateTime<Utc>>,
  pub status:           VerificationStatus,
  pub source:           VerificationSource,
  pub info:             Option<String>,
  pub needs_auto_check: bool,
  pub is_processed:     bool,
  pub submitted_by:     Option<i64>,
  pub verified_by:      Option<i64>,
}

impl NewMatch {
  /// A record as created by user submission: unfetched, flagged for
  /// auto-check, pending verification unless submitted pre-trusted (in
  /// which case the submitter is recorded as the verifier).
  pub fn submitted(
    tournament_id: Option<i64>,
    external_id:   i64,
    submitter_id:  i64,
    verify:        bool,
  ) -> Self {
    Self {
      external_id,
      name: None,
      tournament_id,
      start_time: None,
      end_time: None,
      status: VerificationStatus::initial(verify),
      source: VerificationSource::Human,
      info: None,
      needs_auto_check: true,
      is_processed: false,
      submitted_by: Some(submitter_id),
      verified_by: verify.then_some(submitter_id),
    }
  }
}
