//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Enum discriminants are
//! stored as their snake_case serde tags. Integer ids map directly onto
//! SQLite INTEGER columns.

use chrono::{DateTime, Utc};
use matchbook_core::{
  duplicates::{DuplicateLink, DuplicateVerdict},
  games::{Game, Score},
  matches::{Match, VerificationSource, VerificationStatus},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── VerificationStatus ──────────────────────────────────────────────────────

/// Must match the `rename_all = "snake_case"` serde tags on the enum.
pub fn encode_status(s: VerificationStatus) -> &'static str {
  match s {
    VerificationStatus::PendingVerification => "pending_verification",
    VerificationStatus::PreVerified => "pre_verified",
    VerificationStatus::Verified => "verified",
    VerificationStatus::Rejected => "rejected",
  }
}

pub fn decode_status(s: &str) -> Result<VerificationStatus> {
  match s {
    "pending_verification" => Ok(VerificationStatus::PendingVerification),
    "pre_verified" => Ok(VerificationStatus::PreVerified),
    "verified" => Ok(VerificationStatus::Verified),
    "rejected" => Ok(VerificationStatus::Rejected),
    other => Err(Error::Decode(format!("unknown status: {other:?}"))),
  }
}

// ─── VerificationSource ──────────────────────────────────────────────────────

pub fn encode_source(s: VerificationSource) -> &'static str {
  match s {
    VerificationSource::Human => "human",
    VerificationSource::System => "system",
    VerificationSource::Unknown => "unknown",
  }
}

pub fn decode_source(s: &str) -> Result<VerificationSource> {
  match s {
    "human" => Ok(VerificationSource::Human),
    "system" => Ok(VerificationSource::System),
    "unknown" => Ok(VerificationSource::Unknown),
    other => Err(Error::Decode(format!("unknown source: {other:?}"))),
  }
}

// ─── DuplicateVerdict ────────────────────────────────────────────────────────

pub fn encode_verdict(v: DuplicateVerdict) -> &'static str {
  match v {
    DuplicateVerdict::Unknown => "unknown",
    DuplicateVerdict::Confirmed => "confirmed",
    DuplicateVerdict::Denied => "denied",
  }
}

pub fn decode_verdict(s: &str) -> Result<DuplicateVerdict> {
  match s {
    "unknown" => Ok(DuplicateVerdict::Unknown),
    "confirmed" => Ok(DuplicateVerdict::Confirmed),
    "denied" => Ok(DuplicateVerdict::Denied),
    other => Err(Error::Decode(format!("unknown verdict: {other:?}"))),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `matches` row.
pub struct RawMatch {
  pub id:               i64,
  pub external_id:      i64,
  pub name:             Option<String>,
  pub tournament_id:    Option<i64>,
  pub start_time:       Option<String>,
  pub end_time:         Option<String>,
  pub status:           String,
  pub source:           String,
  pub info:             Option<String>,
  pub needs_auto_check: bool,
  pub is_processed:     bool,
  pub submitted_by:     Option<i64>,
  pub verified_by:      Option<i64>,
  pub created_at:       String,
  pub updated_at:       Option<String>,
}

impl RawMatch {
  /// Read the columns selected by [`crate::store::MATCH_COLS`], in order.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:               row.get(0)?,
      external_id:      row.get(1)?,
      name:             row.get(2)?,
      tournament_id:    row.get(3)?,
      start_time:       row.get(4)?,
      end_time:         row.get(5)?,
      status:           row.get(6)?,
      source:           row.get(7)?,
      info:             row.get(8)?,
      needs_auto_check: row.get(9)?,
      is_processed:     row.get(10)?,
      submitted_by:     row.get(11)?,
      verified_by:      row.get(12)?,
      created_at:       row.get(13)?,
      updated_at:       row.get(14)?,
    })
  }

  pub fn into_match(self) -> Result<Match> {
    Ok(Match {
      id:               self.id,
      external_id:      self.external_id,
      name:             self.name,
      tournament_id:    self.tournament_id,
      start_time:       self.start_time.as_deref().map(decode_dt).transpose()?,
      end_time:         self.end_time.as_deref().map(decode_dt).transpose()?,
      status:           decode_status(&self.status)?,
      source:           decode_source(&self.source)?,
      info:             self.info,
      needs_auto_check: self.needs_auto_check,
      is_processed:     self.is_processed,
      submitted_by:     self.submitted_by,
      verified_by:      self.verified_by,
      created_at:       decode_dt(&self.created_at)?,
      updated_at:       self.updated_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}

/// Raw values read directly from a `games` row.
pub struct RawGame {
  pub id:          i64,
  pub match_id:    i64,
  pub external_id: i64,
  pub beatmap_id:  Option<i64>,
  pub start_time:  Option<String>,
}

impl RawGame {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      match_id:    row.get(1)?,
      external_id: row.get(2)?,
      beatmap_id:  row.get(3)?,
      start_time:  row.get(4)?,
    })
  }

  pub fn into_game(self) -> Result<Game> {
    Ok(Game {
      id:          self.id,
      match_id:    self.match_id,
      external_id: self.external_id,
      beatmap_id:  self.beatmap_id,
      start_time:  self.start_time.as_deref().map(decode_dt).transpose()?,
    })
  }
}

/// Raw values read directly from a `duplicate_links` row.
pub struct RawLink {
  pub id:                i64,
  pub external_match_id: i64,
  pub suspected_root_id: i64,
  pub verified_by:       Option<i64>,
  pub verdict:           String,
}

impl RawLink {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                row.get(0)?,
      external_match_id: row.get(1)?,
      suspected_root_id: row.get(2)?,
      verified_by:       row.get(3)?,
      verdict:           row.get(4)?,
    })
  }

  pub fn into_link(self) -> Result<DuplicateLink> {
    Ok(DuplicateLink {
      id:                self.id,
      external_match_id: self.external_match_id,
      suspected_root_id: self.suspected_root_id,
      verified_by:       self.verified_by,
      verdict:           decode_verdict(&self.verdict)?,
    })
  }
}

/// Scores need no decoding; map straight to the domain type.
pub fn score_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Score> {
  Ok(Score {
    id:        row.get(0)?,
    game_id:   row.get(1)?,
    player_id: row.get(2)?,
    score:     row.get(3)?,
  })
}
