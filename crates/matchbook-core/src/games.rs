//! Game and Score — the child data a match owns.
//!
//! Ownership is exclusive: a game belongs to exactly one match at any
//! instant. The merge engine moves games between matches by reassigning the
//! owning `match_id`, never by copying.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Game ────────────────────────────────────────────────────────────────────

/// One game (map) played inside a match lobby.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
  pub id:          i64,
  /// Owning match; the only field the merge engine ever rewrites.
  pub match_id:    i64,
  pub external_id: i64,
  pub beatmap_id:  Option<i64>,
  pub start_time:  Option<DateTime<Utc>>,
}

/// Input to [`crate::store::MatchStore::add_game`].
#[derive(Debug, Clone)]
pub struct NewGame {
  pub match_id:    i64,
  pub external_id: i64,
  pub beatmap_id:  Option<i64>,
  pub start_time:  Option<DateTime<Utc>>,
}

// ─── Score ───────────────────────────────────────────────────────────────────

/// One player's score in one game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Score {
  pub id:        i64,
  pub game_id:   i64,
  pub player_id: i64,
  pub score:     i64,
}

/// Input to [`crate::store::MatchStore::add_score`].
#[derive(Debug, Clone)]
pub struct NewScore {
  pub game_id:   i64,
  pub player_id: i64,
  pub score:     i64,
}

/// A game bundled with its scores, as returned by detail reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameWithScores {
  pub game:   Game,
  pub scores: Vec<Score>,
}
