//! SQL schema for the Matchbook SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS matches (
    id               INTEGER PRIMARY KEY,
    external_id      INTEGER NOT NULL,   -- source-platform id; NOT unique
    name             TEXT,
    tournament_id    INTEGER,
    start_time       TEXT,               -- RFC 3339 UTC; unknown until fetched
    end_time         TEXT,
    status           TEXT NOT NULL,      -- verification status discriminant
    source           TEXT NOT NULL DEFAULT 'unknown',
    info             TEXT,
    needs_auto_check INTEGER NOT NULL DEFAULT 1,
    is_processed     INTEGER NOT NULL DEFAULT 0,
    submitted_by     INTEGER,
    verified_by      INTEGER,
    created_at       TEXT NOT NULL,      -- ISO 8601 UTC; store-assigned
    updated_at       TEXT
);

-- A game is owned by exactly one match. ON DELETE CASCADE destroys whatever
-- children a match still owns at deletion time; the merge engine reassigns
-- games away before deleting a duplicate shell.
CREATE TABLE IF NOT EXISTS games (
    id          INTEGER PRIMARY KEY,
    match_id    INTEGER NOT NULL REFERENCES matches(id) ON DELETE CASCADE,
    external_id INTEGER NOT NULL,
    beatmap_id  INTEGER,
    start_time  TEXT
);

CREATE TABLE IF NOT EXISTS scores (
    id        INTEGER PRIMARY KEY,
    game_id   INTEGER NOT NULL REFERENCES games(id) ON DELETE CASCADE,
    player_id INTEGER NOT NULL,
    score     INTEGER NOT NULL
);

-- The ledger is append-mostly: a row gains a verdict exactly once and is
-- never deleted. Deliberately no foreign key on suspected_root_id: the
-- audit row must outlive any match row it references.
CREATE TABLE IF NOT EXISTS duplicate_links (
    id                INTEGER PRIMARY KEY,
    external_match_id INTEGER NOT NULL,
    suspected_root_id INTEGER NOT NULL,
    verified_by       INTEGER,
    verdict           TEXT NOT NULL DEFAULT 'unknown'
);

CREATE INDEX IF NOT EXISTS matches_external_idx   ON matches(external_id);
CREATE INDEX IF NOT EXISTS matches_tournament_idx ON matches(tournament_id);
CREATE INDEX IF NOT EXISTS games_match_idx        ON games(match_id);
CREATE INDEX IF NOT EXISTS scores_game_idx        ON scores(game_id);
CREATE INDEX IF NOT EXISTS scores_player_idx      ON scores(player_id);
CREATE INDEX IF NOT EXISTS links_root_idx         ON duplicate_links(suspected_root_id);
CREATE INDEX IF NOT EXISTS links_external_idx     ON duplicate_links(external_match_id);

PRAGMA user_version = 1;
";
