//! Duplicate Detector — groups matches believed to describe the same
//! real-world event.
//!
//! The detector is read-only: it fetches the full match table and ledger
//! once, then computes groups in memory. Two independent rules run and
//! their outputs are concatenated, not cross-deduplicated — callers must
//! tolerate overlapping groups referencing the same match under different
//! rules.

use std::collections::{BTreeMap, HashSet};

use chrono::{Duration, NaiveDate};
use matchbook_core::{
  duplicates::DuplicateVerdict, matches::Match, store::MatchStore,
};
use serde::Serialize;

use crate::{Error, Result};

/// Which grouping rule produced a candidate group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupRule {
  /// Same `(tournament_id, external_id)` pair.
  ExactId,
  /// Same `(tournament_id, name, start date)` with start times within two
  /// hours of at least one other member.
  NameTime,
}

/// Two or more matches suspected to be the same event.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateGroup {
  pub rule:    GroupRule,
  pub matches: Vec<Match>,
}

/// Scan the store for duplicate candidate groups.
///
/// Rule 1 (exact id): matches sharing `(tournament_id, external_id)`,
/// excluding any whose external id is already referenced in the ledger or
/// has a confirmed verdict. Rule 2 (name/time): matches sharing
/// `(tournament_id, name, start date)` and starting within two hours
/// (inclusive) of at least one *other* cluster member; unnamed and
/// unscheduled matches never qualify, nor do ledger-referenced ones.
///
/// The closeness test is applied pairwise, not transitively: a member is
/// kept if *any* other member is close, so a chain A–B–C survives as one
/// group even when A and C are more than two hours apart.
pub async fn detect_duplicate_groups<S: MatchStore>(
  store: &S,
) -> Result<Vec<DuplicateGroup>> {
  let matches = store.all_matches().await.map_err(Error::store)?;
  let links = store.all_duplicate_links().await.map_err(Error::store)?;

  let referenced: HashSet<i64> =
    links.iter().map(|l| l.external_match_id).collect();
  let confirmed: HashSet<i64> = links
    .iter()
    .filter(|l| l.verdict == DuplicateVerdict::Confirmed)
    .map(|l| l.external_match_id)
    .collect();

  let mut groups = Vec::new();

  // ── Rule 1: exact (tournament, external id) collisions ──────────────────
  let mut by_external: BTreeMap<(Option<i64>, i64), Vec<&Match>> =
    BTreeMap::new();
  for m in &matches {
    if referenced.contains(&m.external_id) || confirmed.contains(&m.external_id)
    {
      continue;
    }
    by_external
      .entry((m.tournament_id, m.external_id))
      .or_default()
      .push(m);
  }
  for group in by_external.into_values() {
    if group.len() > 1 {
      groups.push(DuplicateGroup {
        rule:    GroupRule::ExactId,
        matches: group.into_iter().cloned().collect(),
      });
    }
  }

  // ── Rule 2: same name and day, starts within two hours ──────────────────
  let mut by_name_date: BTreeMap<(Option<i64>, &str, NaiveDate), Vec<&Match>> =
    BTreeMap::new();
  for m in &matches {
    let (Some(name), Some(start)) = (m.name.as_deref(), m.start_time) else {
      continue;
    };
    if referenced.contains(&m.external_id) {
      continue;
    }
    by_name_date
      .entry((m.tournament_id, name, start.date_naive()))
      .or_default()
      .push(m);
  }
  for cluster in by_name_date.into_values() {
    let close: Vec<&Match> = cluster
      .iter()
      .copied()
      .filter(|m1| {
        cluster.iter().any(|m2| m2.id != m1.id && within_two_hours(m1, m2))
      })
      .collect();
    if close.len() > 1 {
      groups.push(DuplicateGroup {
        rule:    GroupRule::NameTime,
        matches: close.into_iter().cloned().collect(),
      });
    }
  }

  Ok(groups)
}

/// Inclusive: a pair exactly two hours apart is close; 2h01m is not.
fn within_two_hours(a: &Match, b: &Match) -> bool {
  match (a.start_time, b.start_time) {
    (Some(sa), Some(sb)) => (sa - sb).abs() <= Duration::hours(2),
    _ => false,
  }
}
