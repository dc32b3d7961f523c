//! The `MatchStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `matchbook-store-sqlite`). The pipeline and API layers depend on this
//! abstraction, not on any concrete backend.
//!
//! Reads that feed rating computation (`list_matches` with
//! `verified_only`, `search_matches`, `player_matches`) must only return
//! matches passing [`Match::is_rating_eligible`](crate::matches::Match::is_rating_eligible);
//! the gate is enforced by query-time filtering, never by restricting
//! writes.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::{
  duplicates::{DuplicateLink, NewDuplicateLink},
  games::{Game, NewGame, NewScore, Score},
  matches::{
    Match, MatchDetail, NewMatch, VerificationSource, VerificationStatus,
  },
};

/// Abstraction over a Matchbook storage backend.
///
/// All mutations go through these methods so the verification state
/// machine's invariants cannot be bypassed by direct field writes.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait MatchStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Matches ───────────────────────────────────────────────────────────

  /// Persist a new match. The internal id and `created_at` are assigned by
  /// the store.
  fn create_match(
    &self,
    input: NewMatch,
  ) -> impl Future<Output = Result<Match, Self::Error>> + Send + '_;

  /// Retrieve a match by internal id. Returns `None` if not found.
  fn get_match(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Match>, Self::Error>> + Send + '_;

  /// Retrieve a match with its games and scores.
  fn get_match_detail(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<MatchDetail>, Self::Error>> + Send + '_;

  /// First match carrying the given external id, if any. External ids are
  /// not unique while duplicate groups remain unresolved.
  fn get_match_by_external_id(
    &self,
    external_id: i64,
  ) -> impl Future<Output = Result<Option<Match>, Self::Error>> + Send + '_;

  /// All matches whose external id is in `external_ids`.
  fn get_matches_by_external_ids(
    &self,
    external_ids: Vec<i64>,
  ) -> impl Future<Output = Result<Vec<Match>, Self::Error>> + Send + '_;

  /// Every match in the store, unfiltered. Detector input.
  fn all_matches(
    &self,
  ) -> impl Future<Output = Result<Vec<Match>, Self::Error>> + Send + '_;

  /// Paged listing ordered by internal id. With `verified_only`, only
  /// rating-eligible matches are returned.
  fn list_matches(
    &self,
    limit:         u32,
    page:          u32,
    verified_only: bool,
  ) -> impl Future<Output = Result<Vec<Match>, Self::Error>> + Send + '_;

  /// Case-insensitive substring search over rating-eligible match names.
  /// Capped at 30 results.
  fn search_matches<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Vec<Match>, Self::Error>> + Send + 'a;

  /// Rating-eligible matches a player has a score in, optionally bounded
  /// by start time.
  fn player_matches(
    &self,
    player_id: i64,
    after:     Option<DateTime<Utc>>,
    before:    Option<DateTime<Utc>>,
  ) -> impl Future<Output = Result<Vec<Match>, Self::Error>> + Send + '_;

  /// Matches flagged for auto-check that are already externally processed
  /// (the checks need the fetched data).
  fn matches_needing_auto_check(
    &self,
    limit: u32,
  ) -> impl Future<Output = Result<Vec<Match>, Self::Error>> + Send + '_;

  /// Oldest match the external fetch worker has not yet processed.
  fn first_match_needing_processing(
    &self,
  ) -> impl Future<Output = Result<Option<Match>, Self::Error>> + Send + '_;

  /// Set status, source, optional free-text info and optionally the
  /// verifying identity. Never touches `needs_auto_check`. Returns the
  /// updated match, or `None` if the id does not exist.
  fn update_verification_status(
    &self,
    id:          i64,
    status:      VerificationStatus,
    source:      VerificationSource,
    info:        Option<String>,
    verifier_id: Option<i64>,
  ) -> impl Future<Output = Result<Option<Match>, Self::Error>> + Send + '_;

  /// Bulk-flag `needs_auto_check`. With `invalid_only`, only matches whose
  /// status is neither `Verified` nor `PreVerified` are flagged; otherwise
  /// every match is. Returns the number of rows affected.
  fn set_require_auto_check(
    &self,
    invalid_only: bool,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Record external processing completion. Never changes verification
  /// status. Returns `false` if the id does not exist.
  fn mark_processed(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Games and scores ──────────────────────────────────────────────────

  fn add_game(
    &self,
    input: NewGame,
  ) -> impl Future<Output = Result<Game, Self::Error>> + Send + '_;

  fn add_score(
    &self,
    input: NewScore,
  ) -> impl Future<Output = Result<Score, Self::Error>> + Send + '_;

  fn games_for_match(
    &self,
    match_id: i64,
  ) -> impl Future<Output = Result<Vec<Game>, Self::Error>> + Send + '_;

  /// All scores across all games of a match.
  fn scores_for_match(
    &self,
    match_id: i64,
  ) -> impl Future<Output = Result<Vec<Score>, Self::Error>> + Send + '_;

  /// Atomically reassign every game owned by `from_match_id` to
  /// `to_match_id`. Durable once the future resolves. Returns the number
  /// of games moved.
  fn reassign_games(
    &self,
    from_match_id: i64,
    to_match_id:   i64,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Delete a match (cascading to any games it still owns, and their
  /// scores). Idempotent: deleting an already-deleted id is not an error.
  /// Returns whether a row was removed.
  fn delete_match(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Duplicate link ledger ─────────────────────────────────────────────

  /// Append a suspicion to the ledger with an `Unknown` verdict.
  fn add_duplicate_link(
    &self,
    input: NewDuplicateLink,
  ) -> impl Future<Output = Result<DuplicateLink, Self::Error>> + Send + '_;

  /// Every link pointing at `root_id`, resolved or not.
  fn links_for_root(
    &self,
    root_id: i64,
  ) -> impl Future<Output = Result<Vec<DuplicateLink>, Self::Error>> + Send + '_;

  /// Links pointing at `root_id` with a `Confirmed` verdict.
  fn confirmed_links_for_root(
    &self,
    root_id: i64,
  ) -> impl Future<Output = Result<Vec<DuplicateLink>, Self::Error>> + Send + '_;

  /// Links still awaiting a verdict, across all roots.
  fn unresolved_links(
    &self,
  ) -> impl Future<Output = Result<Vec<DuplicateLink>, Self::Error>> + Send + '_;

  /// The full ledger. Detector input.
  fn all_duplicate_links(
    &self,
  ) -> impl Future<Output = Result<Vec<DuplicateLink>, Self::Error>> + Send + '_;

  /// Stamp the verifier and verdict on every link pointing at `root_id`.
  /// Returns the number of links updated. Links are mutated exactly this
  /// once and never deleted.
  fn record_duplicate_verdict(
    &self,
    root_id:     i64,
    verifier_id: i64,
    confirmed:   bool,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}
