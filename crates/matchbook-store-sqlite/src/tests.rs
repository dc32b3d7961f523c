//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{TimeZone, Utc};
use matchbook_core::{
  duplicates::{DuplicateVerdict, NewDuplicateLink},
  games::{NewGame, NewScore},
  matches::{NewMatch, VerificationSource, VerificationStatus},
  store::MatchStore,
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

/// A freshly-submitted match: pending, unprocessed, flagged for auto-check.
fn submitted(tournament: i64, external_id: i64) -> NewMatch {
  NewMatch::submitted(Some(tournament), external_id, 40, false)
}

/// A match passing the rating-eligibility gate.
fn eligible(tournament: i64, external_id: i64, name: &str) -> NewMatch {
  NewMatch {
    external_id,
    name: Some(name.into()),
    tournament_id: Some(tournament),
    start_time: None,
    end_time: None,
    status: VerificationStatus::Verified,
    source: VerificationSource::Human,
    info: None,
    needs_auto_check: false,
    is_processed: true,
    submitted_by: Some(40),
    verified_by: Some(99),
  }
}

// ─── Match CRUD ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_match_roundtrip() {
  let s = store().await;

  let start = Utc.with_ymd_and_hms(2024, 3, 9, 18, 30, 0).unwrap();
  let mut input = eligible(7, 111, "Cup: A vs B");
  input.start_time = Some(start);
  input.info = Some("auto pass".into());

  let created = s.create_match(input).await.unwrap();
  let fetched = s.get_match(created.id).await.unwrap().unwrap();

  assert_eq!(fetched.id, created.id);
  assert_eq!(fetched.external_id, 111);
  assert_eq!(fetched.name.as_deref(), Some("Cup: A vs B"));
  assert_eq!(fetched.tournament_id, Some(7));
  assert_eq!(fetched.start_time, Some(start));
  assert_eq!(fetched.status, VerificationStatus::Verified);
  assert_eq!(fetched.source, VerificationSource::Human);
  assert_eq!(fetched.info.as_deref(), Some("auto pass"));
  assert!(!fetched.needs_auto_check);
  assert!(fetched.is_processed);
  assert_eq!(fetched.submitted_by, Some(40));
  assert_eq!(fetched.verified_by, Some(99));
  assert!(fetched.updated_at.is_none());
}

#[tokio::test]
async fn get_match_missing_returns_none() {
  let s = store().await;
  assert!(s.get_match(4242).await.unwrap().is_none());
}

#[tokio::test]
async fn external_id_lookups() {
  let s = store().await;
  let a = s.create_match(submitted(7, 111)).await.unwrap();
  s.create_match(submitted(7, 222)).await.unwrap();

  let found = s.get_match_by_external_id(111).await.unwrap().unwrap();
  assert_eq!(found.id, a.id);
  assert!(s.get_match_by_external_id(999).await.unwrap().is_none());

  let subset = s
    .get_matches_by_external_ids(vec![111, 999])
    .await
    .unwrap();
  assert_eq!(subset.len(), 1);
  assert_eq!(subset[0].external_id, 111);

  assert!(s.get_matches_by_external_ids(vec![]).await.unwrap().is_empty());
}

#[tokio::test]
async fn list_matches_pages_in_id_order() {
  let s = store().await;
  for i in 0..5 {
    s.create_match(submitted(7, 100 + i)).await.unwrap();
  }

  let first = s.list_matches(2, 0, false).await.unwrap();
  let second = s.list_matches(2, 1, false).await.unwrap();
  assert_eq!(first.len(), 2);
  assert_eq!(second.len(), 2);
  assert!(first[1].id < second[0].id);
}

#[tokio::test]
async fn verified_listing_applies_the_eligibility_gate() {
  let s = store().await;
  s.create_match(eligible(7, 111, "in")).await.unwrap();

  // Fails exactly one gate condition each.
  let mut unprocessed = eligible(7, 222, "out");
  unprocessed.is_processed = false;
  s.create_match(unprocessed).await.unwrap();

  let mut flagged = eligible(7, 333, "out");
  flagged.needs_auto_check = true;
  s.create_match(flagged).await.unwrap();

  let mut rejected = eligible(7, 444, "out");
  rejected.status = VerificationStatus::Rejected;
  s.create_match(rejected).await.unwrap();

  // PreVerified counts as trusted.
  let mut pre = eligible(7, 555, "in");
  pre.status = VerificationStatus::PreVerified;
  s.create_match(pre).await.unwrap();

  let listed = s.list_matches(50, 0, true).await.unwrap();
  let ids: Vec<i64> = listed.iter().map(|m| m.external_id).collect();
  assert_eq!(ids, vec![111, 555]);

  let all = s.list_matches(50, 0, false).await.unwrap();
  assert_eq!(all.len(), 5);
}

// ─── Search ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn search_is_case_insensitive_and_eligible_only() {
  let s = store().await;
  s.create_match(eligible(7, 111, "OWC 2023: (US) vs (KR)")).await.unwrap();
  let mut hidden = eligible(7, 222, "OWC 2023: (DE) vs (FR)");
  hidden.status = VerificationStatus::PendingVerification;
  s.create_match(hidden).await.unwrap();

  let results = s.search_matches("owc 2023").await.unwrap();
  assert_eq!(results.len(), 1);
  assert_eq!(results[0].external_id, 111);
}

#[tokio::test]
async fn search_treats_underscore_literally() {
  let s = store().await;
  s.create_match(eligible(7, 111, "CWC_2024 grand final")).await.unwrap();
  s.create_match(eligible(7, 222, "CWCX2024 grand final")).await.unwrap();

  let results = s.search_matches("CWC_2024").await.unwrap();
  assert_eq!(results.len(), 1);
  assert_eq!(results[0].external_id, 111);
}

// ─── Player and worker queries ───────────────────────────────────────────────

#[tokio::test]
async fn player_matches_filters_by_participation_and_time() {
  let s = store().await;

  let mut early = eligible(7, 111, "early");
  early.start_time = Some(Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap());
  let early = s.create_match(early).await.unwrap();

  let mut late = eligible(7, 222, "late");
  late.start_time = Some(Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap());
  let late = s.create_match(late).await.unwrap();

  for m in [&early, &late] {
    let game = s
      .add_game(NewGame {
        match_id:    m.id,
        external_id: m.id * 100,
        beatmap_id:  None,
        start_time:  None,
      })
      .await
      .unwrap();
    s.add_score(NewScore { game_id: game.id, player_id: 5, score: 1 })
      .await
      .unwrap();
  }

  let all = s.player_matches(5, None, None).await.unwrap();
  assert_eq!(all.len(), 2);

  let bounded = s
    .player_matches(
      5,
      Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()),
      None,
    )
    .await
    .unwrap();
  assert_eq!(bounded.len(), 1);
  assert_eq!(bounded[0].id, late.id);

  assert!(s.player_matches(6, None, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn auto_check_queue_requires_processed_matches() {
  let s = store().await;

  // Flagged and processed: in the queue.
  let mut ready = eligible(7, 111, "ready");
  ready.needs_auto_check = true;
  s.create_match(ready).await.unwrap();

  // Flagged but unfetched: the checks would have no data to run on.
  s.create_match(submitted(7, 222)).await.unwrap();

  let queue = s.matches_needing_auto_check(10).await.unwrap();
  assert_eq!(queue.len(), 1);
  assert_eq!(queue[0].external_id, 111);
}

#[tokio::test]
async fn first_match_needing_processing_is_oldest_unfetched() {
  let s = store().await;
  s.create_match(eligible(7, 111, "done")).await.unwrap();
  let a = s.create_match(submitted(7, 222)).await.unwrap();
  s.create_match(submitted(7, 333)).await.unwrap();

  let next = s.first_match_needing_processing().await.unwrap().unwrap();
  assert_eq!(next.id, a.id);
}

// ─── Verification state machine ──────────────────────────────────────────────

#[tokio::test]
async fn update_verification_status_sets_fields_and_stamps_updated_at() {
  let s = store().await;
  let record = s.create_match(submitted(7, 111)).await.unwrap();

  let updated = s
    .update_verification_status(
      record.id,
      VerificationStatus::Verified,
      VerificationSource::Human,
      Some("reviewed by hand".into()),
      Some(99),
    )
    .await
    .unwrap()
    .unwrap();

  assert_eq!(updated.status, VerificationStatus::Verified);
  assert_eq!(updated.source, VerificationSource::Human);
  assert_eq!(updated.info.as_deref(), Some("reviewed by hand"));
  assert_eq!(updated.verified_by, Some(99));
  assert!(updated.updated_at.is_some());
  // Status updates never clear the auto-check flag.
  assert!(updated.needs_auto_check);
}

#[tokio::test]
async fn update_without_verifier_keeps_the_existing_one() {
  let s = store().await;
  let record = s.create_match(eligible(7, 111, "m")).await.unwrap();

  let updated = s
    .update_verification_status(
      record.id,
      VerificationStatus::Rejected,
      VerificationSource::System,
      None,
      None,
    )
    .await
    .unwrap()
    .unwrap();

  assert_eq!(updated.verified_by, Some(99));
}

#[tokio::test]
async fn update_verification_status_missing_returns_none() {
  let s = store().await;
  let result = s
    .update_verification_status(
      4242,
      VerificationStatus::Verified,
      VerificationSource::Human,
      None,
      None,
    )
    .await
    .unwrap();
  assert!(result.is_none());
}

#[tokio::test]
async fn require_auto_check_invalid_only_spares_trusted_matches() {
  let s = store().await;

  let verified = s.create_match(eligible(7, 111, "v")).await.unwrap();
  let mut pre = eligible(7, 222, "p");
  pre.status = VerificationStatus::PreVerified;
  let pre = s.create_match(pre).await.unwrap();
  let mut pending = eligible(7, 333, "x");
  pending.status = VerificationStatus::PendingVerification;
  let pending = s.create_match(pending).await.unwrap();

  let affected = s.set_require_auto_check(true).await.unwrap();
  assert_eq!(affected, 1);
  assert!(!s.get_match(verified.id).await.unwrap().unwrap().needs_auto_check);
  assert!(!s.get_match(pre.id).await.unwrap().unwrap().needs_auto_check);
  assert!(s.get_match(pending.id).await.unwrap().unwrap().needs_auto_check);

  let affected = s.set_require_auto_check(false).await.unwrap();
  assert_eq!(affected, 3);
  assert!(s.get_match(verified.id).await.unwrap().unwrap().needs_auto_check);
}

#[tokio::test]
async fn mark_processed_never_touches_status() {
  let s = store().await;
  let record = s.create_match(submitted(7, 111)).await.unwrap();

  assert!(s.mark_processed(record.id).await.unwrap());
  let fetched = s.get_match(record.id).await.unwrap().unwrap();
  assert!(fetched.is_processed);
  assert_eq!(fetched.status, VerificationStatus::PendingVerification);

  assert!(!s.mark_processed(4242).await.unwrap());
}

// ─── Games and scores ────────────────────────────────────────────────────────

#[tokio::test]
async fn match_detail_groups_scores_under_their_games() {
  let s = store().await;
  let record = s.create_match(eligible(7, 111, "m")).await.unwrap();

  let g1 = s
    .add_game(NewGame {
      match_id:    record.id,
      external_id: 1001,
      beatmap_id:  Some(42),
      start_time:  None,
    })
    .await
    .unwrap();
  let g2 = s
    .add_game(NewGame {
      match_id:    record.id,
      external_id: 1002,
      beatmap_id:  None,
      start_time:  None,
    })
    .await
    .unwrap();
  for pid in [5, 6] {
    s.add_score(NewScore { game_id: g1.id, player_id: pid, score: 100 })
      .await
      .unwrap();
  }
  s.add_score(NewScore { game_id: g2.id, player_id: 5, score: 200 })
    .await
    .unwrap();

  let detail = s.get_match_detail(record.id).await.unwrap().unwrap();
  assert_eq!(detail.record.id, record.id);
  assert_eq!(detail.games.len(), 2);
  assert_eq!(detail.games[0].game.id, g1.id);
  assert_eq!(detail.games[0].scores.len(), 2);
  assert_eq!(detail.games[1].scores.len(), 1);
  assert_eq!(detail.games[0].game.beatmap_id, Some(42));
}

#[tokio::test]
async fn reassign_games_moves_ownership_only() {
  let s = store().await;
  let from = s.create_match(eligible(7, 111, "from")).await.unwrap();
  let to = s.create_match(eligible(7, 222, "to")).await.unwrap();

  let game = s
    .add_game(NewGame {
      match_id:    from.id,
      external_id: 1001,
      beatmap_id:  Some(42),
      start_time:  None,
    })
    .await
    .unwrap();
  s.add_score(NewScore { game_id: game.id, player_id: 5, score: 100 })
    .await
    .unwrap();

  let moved = s.reassign_games(from.id, to.id).await.unwrap();
  assert_eq!(moved, 1);

  assert!(s.games_for_match(from.id).await.unwrap().is_empty());
  let games = s.games_for_match(to.id).await.unwrap();
  assert_eq!(games.len(), 1);
  assert_eq!(games[0].id, game.id);
  assert_eq!(games[0].beatmap_id, Some(42));
  assert_eq!(s.scores_for_match(to.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn delete_match_cascades_and_is_idempotent() {
  let s = store().await;
  let record = s.create_match(eligible(7, 111, "m")).await.unwrap();
  let game = s
    .add_game(NewGame {
      match_id:    record.id,
      external_id: 1001,
      beatmap_id:  None,
      start_time:  None,
    })
    .await
    .unwrap();
  s.add_score(NewScore { game_id: game.id, player_id: 5, score: 100 })
    .await
    .unwrap();

  assert!(s.delete_match(record.id).await.unwrap());
  assert!(s.get_match(record.id).await.unwrap().is_none());
  assert!(s.games_for_match(record.id).await.unwrap().is_empty());
  assert!(s.scores_for_match(record.id).await.unwrap().is_empty());

  // Safe to re-run.
  assert!(!s.delete_match(record.id).await.unwrap());
}

// ─── Duplicate link ledger ───────────────────────────────────────────────────

#[tokio::test]
async fn new_links_start_unresolved() {
  let s = store().await;
  let root = s.create_match(eligible(7, 111, "root")).await.unwrap();

  let link = s
    .add_duplicate_link(NewDuplicateLink {
      external_match_id: 222,
      suspected_root_id: root.id,
    })
    .await
    .unwrap();
  assert_eq!(link.verdict, DuplicateVerdict::Unknown);
  assert!(!link.verdict.is_resolved());
  assert!(link.verified_by.is_none());

  let unresolved = s.unresolved_links().await.unwrap();
  assert_eq!(unresolved.len(), 1);
  assert_eq!(unresolved[0].id, link.id);
}

#[tokio::test]
async fn verdicts_apply_to_all_links_of_one_root() {
  let s = store().await;
  let root = s.create_match(eligible(7, 111, "root")).await.unwrap();
  let other = s.create_match(eligible(7, 999, "other")).await.unwrap();

  for ext in [222, 333] {
    s.add_duplicate_link(NewDuplicateLink {
      external_match_id: ext,
      suspected_root_id: root.id,
    })
    .await
    .unwrap();
  }
  s.add_duplicate_link(NewDuplicateLink {
    external_match_id: 444,
    suspected_root_id: other.id,
  })
  .await
  .unwrap();

  let updated = s.record_duplicate_verdict(root.id, 99, true).await.unwrap();
  assert_eq!(updated, 2);

  let confirmed = s.confirmed_links_for_root(root.id).await.unwrap();
  assert_eq!(confirmed.len(), 2);
  assert!(confirmed.iter().all(|l| l.verified_by == Some(99)));

  // The other root's link is untouched.
  let others = s.links_for_root(other.id).await.unwrap();
  assert_eq!(others[0].verdict, DuplicateVerdict::Unknown);

  assert_eq!(s.all_duplicate_links().await.unwrap().len(), 3);
}

#[tokio::test]
async fn ledger_rows_survive_match_deletion() {
  let s = store().await;
  let root = s.create_match(eligible(7, 111, "root")).await.unwrap();
  s.add_duplicate_link(NewDuplicateLink {
    external_match_id: 222,
    suspected_root_id: root.id,
  })
  .await
  .unwrap();
  s.record_duplicate_verdict(root.id, 99, true).await.unwrap();

  // Even deleting the root leaves the audit trail intact.
  s.delete_match(root.id).await.unwrap();
  let links = s.links_for_root(root.id).await.unwrap();
  assert_eq!(links.len(), 1);
  assert_eq!(links[0].verdict, DuplicateVerdict::Confirmed);
}
