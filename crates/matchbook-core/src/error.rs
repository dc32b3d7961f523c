//! Error types for `matchbook-core`.
//!
//! Every merge precondition gets its own variant so callers can tell
//! "nothing to merge" from "not ready to merge" from "merge data
//! inconsistent" without parsing message strings.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("match not found: {0}")]
  MatchNotFound(i64),

  #[error("root match {0} is not externally processed")]
  RootNotProcessed(i64),

  #[error("root match {0} does not contain any games")]
  RootHasNoGames(i64),

  #[error("root match {0} has no scores")]
  RootHasNoScores(i64),

  #[error("match {0} does not have any confirmed duplicates")]
  NoConfirmedDuplicates(i64),

  #[error("duplicate {duplicate} is not in the same tournament as root {root}")]
  TournamentMismatch { root: i64, duplicate: i64 },

  #[error("duplicate match {0} is not externally processed")]
  DuplicateNotProcessed(i64),

  #[error(
    "duplicate {duplicate} matches root {root} by neither name nor external \
     id"
  )]
  DuplicateMismatch { root: i64, duplicate: i64 },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
