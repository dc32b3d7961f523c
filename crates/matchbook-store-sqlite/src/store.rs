//! [`SqliteStore`] — the SQLite implementation of [`MatchStore`].

use std::{collections::HashMap, path::Path};

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;

use matchbook_core::{
  duplicates::{DuplicateLink, DuplicateVerdict, NewDuplicateLink},
  games::{Game, GameWithScores, NewGame, NewScore, Score},
  matches::{
    Match, MatchDetail, NewMatch, VerificationSource, VerificationStatus,
  },
  store::MatchStore,
};

use crate::{
  encode::{
    encode_dt, encode_source, encode_status, encode_verdict, score_from_row,
    RawGame, RawLink, RawMatch,
  },
  schema::SCHEMA,
  Error, Result,
};

/// The `matches` columns selected by every match read, in the order
/// [`RawMatch::from_row`] expects. Queries alias the table as `m`.
pub const MATCH_COLS: &str = "m.id, m.external_id, m.name, m.tournament_id, \
  m.start_time, m.end_time, m.status, m.source, m.info, m.needs_auto_check, \
  m.is_processed, m.submitted_by, m.verified_by, m.created_at, m.updated_at";

/// The rating-eligibility gate, as SQL. Must stay in lockstep with
/// [`Match::is_rating_eligible`].
const ELIGIBLE: &str = "m.status IN ('verified', 'pre_verified') \
  AND m.is_processed = 1 AND m.needs_auto_check = 0";

const GAME_COLS: &str = "g.id, g.match_id, g.external_id, g.beatmap_id, \
  g.start_time";

const LINK_COLS: &str =
  "d.id, d.external_match_id, d.suspected_root_id, d.verified_by, d.verdict";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Matchbook store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a SELECT returning whole match rows.
  async fn query_matches(
    &self,
    sql:    String,
    params: Vec<rusqlite::types::Value>,
  ) -> Result<Vec<Match>> {
    let raws: Vec<RawMatch> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), |row| {
            RawMatch::from_row(row)
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMatch::into_match).collect()
  }

  async fn query_links(
    &self,
    sql:    String,
    params: Vec<rusqlite::types::Value>,
  ) -> Result<Vec<DuplicateLink>> {
    let raws: Vec<RawLink> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), |row| {
            RawLink::from_row(row)
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLink::into_link).collect()
  }
}

// ─── MatchStore impl ─────────────────────────────────────────────────────────

impl MatchStore for SqliteStore {
  type Error = Error;

  // ── Matches ───────────────────────────────────────────────────────────────

  async fn create_match(&self, input: NewMatch) -> Result<Match> {
    let created_at = Utc::now();

    let external_id      = input.external_id;
    let name             = input.name.clone();
    let tournament_id    = input.tournament_id;
    let start_str        = input.start_time.map(encode_dt);
    let end_str          = input.end_time.map(encode_dt);
    let status_str       = encode_status(input.status).to_owned();
    let source_str       = encode_source(input.source).to_owned();
    let info             = input.info.clone();
    let needs_auto_check = input.needs_auto_check;
    let is_processed     = input.is_processed;
    let submitted_by     = input.submitted_by;
    let verified_by      = input.verified_by;
    let created_str      = encode_dt(created_at);

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO matches (
             external_id, name, tournament_id, start_time, end_time,
             status, source, info, needs_auto_check, is_processed,
             submitted_by, verified_by, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
          rusqlite::params![
            external_id,
            name,
            tournament_id,
            start_str,
            end_str,
            status_str,
            source_str,
            info,
            needs_auto_check,
            is_processed,
            submitted_by,
            verified_by,
            created_str,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Match {
      id,
      external_id: input.external_id,
      name: input.name,
      tournament_id: input.tournament_id,
      start_time: input.start_time,
      end_time: input.end_time,
      status: input.status,
      source: input.source,
      info: input.info,
      needs_auto_check: input.needs_auto_check,
      is_processed: input.is_processed,
      submitted_by: input.submitted_by,
      verified_by: input.verified_by,
      created_at,
      updated_at: None,
    })
  }

  async fn get_match(&self, id: i64) -> Result<Option<Match>> {
    let sql = format!("SELECT {MATCH_COLS} FROM matches m WHERE m.id = ?1");

    let raw: Option<RawMatch> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id], |row| {
              RawMatch::from_row(row)
            })
            .optional()?,
        )
      })
      .await?;

    raw.map(RawMatch::into_match).transpose()
  }

  async fn get_match_detail(&self, id: i64) -> Result<Option<MatchDetail>> {
    let record = match self.get_match(id).await? {
      Some(m) => m,
      None => return Ok(None),
    };

    let games = self.games_for_match(id).await?;
    let scores = self.scores_for_match(id).await?;

    let mut by_game: HashMap<i64, Vec<Score>> = HashMap::new();
    for score in scores {
      by_game.entry(score.game_id).or_default().push(score);
    }

    let games = games
      .into_iter()
      .map(|game| GameWithScores {
        scores: by_game.remove(&game.id).unwrap_or_default(),
        game,
      })
      .collect();

    Ok(Some(MatchDetail { record, games }))
  }

  async fn get_match_by_external_id(
    &self,
    external_id: i64,
  ) -> Result<Option<Match>> {
    let sql = format!(
      "SELECT {MATCH_COLS} FROM matches m WHERE m.external_id = ?1 \
       ORDER BY m.id LIMIT 1"
    );

    let raw: Option<RawMatch> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![external_id], |row| {
              RawMatch::from_row(row)
            })
            .optional()?,
        )
      })
      .await?;

    raw.map(RawMatch::into_match).transpose()
  }

  async fn get_matches_by_external_ids(
    &self,
    external_ids: Vec<i64>,
  ) -> Result<Vec<Match>> {
    if external_ids.is_empty() {
      return Ok(Vec::new());
    }

    let placeholders =
      vec!["?"; external_ids.len()].join(", ");
    let sql = format!(
      "SELECT {MATCH_COLS} FROM matches m \
       WHERE m.external_id IN ({placeholders}) ORDER BY m.id"
    );
    let params = external_ids
      .into_iter()
      .map(rusqlite::types::Value::from)
      .collect();

    self.query_matches(sql, params).await
  }

  async fn all_matches(&self) -> Result<Vec<Match>> {
    let sql = format!("SELECT {MATCH_COLS} FROM matches m ORDER BY m.id");
    self.query_matches(sql, Vec::new()).await
  }

  async fn list_matches(
    &self,
    limit:         u32,
    page:          u32,
    verified_only: bool,
  ) -> Result<Vec<Match>> {
    let where_clause = if verified_only {
      format!("WHERE {ELIGIBLE}")
    } else {
      String::new()
    };
    let sql = format!(
      "SELECT {MATCH_COLS} FROM matches m {where_clause} \
       ORDER BY m.id LIMIT ?1 OFFSET ?2"
    );
    let params = vec![
      rusqlite::types::Value::from(i64::from(limit)),
      rusqlite::types::Value::from(i64::from(limit) * i64::from(page)),
    ];

    self.query_matches(sql, params).await
  }

  async fn search_matches(&self, name: &str) -> Result<Vec<Match>> {
    // `_` and `%` are LIKE wildcards; escape them so user input is literal.
    let escaped = name
      .replace('\\', r"\\")
      .replace('%', r"\%")
      .replace('_', r"\_");
    let pattern = format!("%{escaped}%");

    let sql = format!(
      "SELECT {MATCH_COLS} FROM matches m \
       WHERE {ELIGIBLE} AND m.name IS NOT NULL \
         AND m.name LIKE ?1 ESCAPE '\\' \
       ORDER BY m.id LIMIT 30"
    );
    let params = vec![rusqlite::types::Value::from(pattern)];

    self.query_matches(sql, params).await
  }

  async fn player_matches(
    &self,
    player_id: i64,
    after:     Option<DateTime<Utc>>,
    before:    Option<DateTime<Utc>>,
  ) -> Result<Vec<Match>> {
    let sql = format!(
      "SELECT DISTINCT {MATCH_COLS} FROM matches m \
       JOIN games g  ON g.match_id = m.id \
       JOIN scores s ON s.game_id  = g.id \
       WHERE s.player_id = ?1 AND {ELIGIBLE} \
         AND (?2 IS NULL OR m.start_time > ?2) \
         AND (?3 IS NULL OR m.start_time < ?3) \
       ORDER BY m.id"
    );
    let params = vec![
      rusqlite::types::Value::from(player_id),
      after.map(encode_dt).map_or(rusqlite::types::Value::Null, Into::into),
      before.map(encode_dt).map_or(rusqlite::types::Value::Null, Into::into),
    ];

    self.query_matches(sql, params).await
  }

  async fn matches_needing_auto_check(&self, limit: u32) -> Result<Vec<Match>> {
    // Only externally processed matches: the checks need the fetched data.
    let sql = format!(
      "SELECT {MATCH_COLS} FROM matches m \
       WHERE m.needs_auto_check = 1 AND m.is_processed = 1 \
       ORDER BY m.id LIMIT ?1"
    );
    let params = vec![rusqlite::types::Value::from(i64::from(limit))];

    self.query_matches(sql, params).await
  }

  async fn first_match_needing_processing(&self) -> Result<Option<Match>> {
    let sql = format!(
      "SELECT {MATCH_COLS} FROM matches m \
       WHERE m.is_processed = 0 ORDER BY m.id LIMIT 1"
    );

    let raw: Option<RawMatch> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, [], |row| RawMatch::from_row(row))
            .optional()?,
        )
      })
      .await?;

    raw.map(RawMatch::into_match).transpose()
  }

  async fn update_verification_status(
    &self,
    id:          i64,
    status:      VerificationStatus,
    source:      VerificationSource,
    info:        Option<String>,
    verifier_id: Option<i64>,
  ) -> Result<Option<Match>> {
    let status_str  = encode_status(status).to_owned();
    let source_str  = encode_source(source).to_owned();
    let updated_str = encode_dt(Utc::now());

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE matches SET
             status      = ?2,
             source      = ?3,
             info        = ?4,
             verified_by = COALESCE(?5, verified_by),
             updated_at  = ?6
           WHERE id = ?1",
          rusqlite::params![
            id,
            status_str,
            source_str,
            info,
            verifier_id,
            updated_str,
          ],
        )?)
      })
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    self.get_match(id).await
  }

  async fn set_require_auto_check(&self, invalid_only: bool) -> Result<u64> {
    let changed = self
      .conn
      .call(move |conn| {
        let sql = if invalid_only {
          "UPDATE matches SET needs_auto_check = 1 \
           WHERE status NOT IN ('verified', 'pre_verified')"
        } else {
          // Applies to all matches.
          "UPDATE matches SET needs_auto_check = 1"
        };
        Ok(conn.execute(sql, [])?)
      })
      .await?;

    Ok(changed as u64)
  }

  async fn mark_processed(&self, id: i64) -> Result<bool> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE matches SET is_processed = 1 WHERE id = ?1",
          rusqlite::params![id],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }

  // ── Games and scores ──────────────────────────────────────────────────────

  async fn add_game(&self, input: NewGame) -> Result<Game> {
    let match_id    = input.match_id;
    let external_id = input.external_id;
    let beatmap_id  = input.beatmap_id;
    let start_str   = input.start_time.map(encode_dt);

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO games (match_id, external_id, beatmap_id, start_time)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![match_id, external_id, beatmap_id, start_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Game {
      id,
      match_id: input.match_id,
      external_id: input.external_id,
      beatmap_id: input.beatmap_id,
      start_time: input.start_time,
    })
  }

  async fn add_score(&self, input: NewScore) -> Result<Score> {
    let game_id   = input.game_id;
    let player_id = input.player_id;
    let score     = input.score;

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO scores (game_id, player_id, score) VALUES (?1, ?2, ?3)",
          rusqlite::params![game_id, player_id, score],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Score {
      id,
      game_id: input.game_id,
      player_id: input.player_id,
      score: input.score,
    })
  }

  async fn games_for_match(&self, match_id: i64) -> Result<Vec<Game>> {
    let sql = format!(
      "SELECT {GAME_COLS} FROM games g WHERE g.match_id = ?1 ORDER BY g.id"
    );

    let raws: Vec<RawGame> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![match_id], |row| RawGame::from_row(row))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawGame::into_game).collect()
  }

  async fn scores_for_match(&self, match_id: i64) -> Result<Vec<Score>> {
    let scores = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT s.id, s.game_id, s.player_id, s.score
           FROM scores s
           JOIN games g ON g.id = s.game_id
           WHERE g.match_id = ?1
           ORDER BY s.id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![match_id], score_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(scores)
  }

  async fn reassign_games(
    &self,
    from_match_id: i64,
    to_match_id:   i64,
  ) -> Result<u64> {
    let moved = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE games SET match_id = ?2 WHERE match_id = ?1",
          rusqlite::params![from_match_id, to_match_id],
        )?)
      })
      .await?;

    Ok(moved as u64)
  }

  async fn delete_match(&self, id: i64) -> Result<bool> {
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM matches WHERE id = ?1",
          rusqlite::params![id],
        )?)
      })
      .await?;

    Ok(deleted > 0)
  }

  // ── Duplicate link ledger ─────────────────────────────────────────────────

  async fn add_duplicate_link(
    &self,
    input: NewDuplicateLink,
  ) -> Result<DuplicateLink> {
    let external_match_id = input.external_match_id;
    let suspected_root_id = input.suspected_root_id;

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO duplicate_links (external_match_id, suspected_root_id)
           VALUES (?1, ?2)",
          rusqlite::params![external_match_id, suspected_root_id],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(DuplicateLink {
      id,
      external_match_id: input.external_match_id,
      suspected_root_id: input.suspected_root_id,
      verified_by: None,
      verdict: DuplicateVerdict::Unknown,
    })
  }

  async fn links_for_root(&self, root_id: i64) -> Result<Vec<DuplicateLink>> {
    let sql = format!(
      "SELECT {LINK_COLS} FROM duplicate_links d \
       WHERE d.suspected_root_id = ?1 ORDER BY d.id"
    );
    self
      .query_links(sql, vec![rusqlite::types::Value::from(root_id)])
      .await
  }

  async fn confirmed_links_for_root(
    &self,
    root_id: i64,
  ) -> Result<Vec<DuplicateLink>> {
    let sql = format!(
      "SELECT {LINK_COLS} FROM duplicate_links d \
       WHERE d.suspected_root_id = ?1 AND d.verdict = 'confirmed' \
       ORDER BY d.id"
    );
    self
      .query_links(sql, vec![rusqlite::types::Value::from(root_id)])
      .await
  }

  async fn unresolved_links(&self) -> Result<Vec<DuplicateLink>> {
    let sql = format!(
      "SELECT {LINK_COLS} FROM duplicate_links d \
       WHERE d.verdict = 'unknown' ORDER BY d.id"
    );
    self.query_links(sql, Vec::new()).await
  }

  async fn all_duplicate_links(&self) -> Result<Vec<DuplicateLink>> {
    let sql =
      format!("SELECT {LINK_COLS} FROM duplicate_links d ORDER BY d.id");
    self.query_links(sql, Vec::new()).await
  }

  async fn record_duplicate_verdict(
    &self,
    root_id:     i64,
    verifier_id: i64,
    confirmed:   bool,
  ) -> Result<u64> {
    let verdict = encode_verdict(if confirmed {
      DuplicateVerdict::Confirmed
    } else {
      DuplicateVerdict::Denied
    })
    .to_owned();

    let updated = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE duplicate_links SET verified_by = ?2, verdict = ?3
           WHERE suspected_root_id = ?1",
          rusqlite::params![root_id, verifier_id, verdict],
        )?)
      })
      .await?;

    Ok(updated as u64)
  }
}
