//! SQL schema for the roost SQLite store.
//!
//! The grid is stored sparsely: a `validation_cells` row exists only once a
//! pair has at least one observation, and absent pairs read as the zero cell.
//! Both summary query patterns (all cells for a source, top cells overall)
//! are single indexed scans over the non-zero rows.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS entities (
    entity_seq  INTEGER PRIMARY KEY AUTOINCREMENT,  -- registration order
    name        TEXT NOT NULL UNIQUE,
    created_at  TEXT NOT NULL
);

-- One row per observed comment. Rows are never deleted; only `status`
-- is ever updated, and at most once (pending -> verified | invalid).
CREATE TABLE IF NOT EXISTS validation_records (
    record_seq       INTEGER PRIMARY KEY AUTOINCREMENT,  -- insertion order
    record_id        TEXT NOT NULL UNIQUE,
    source_entity    TEXT NOT NULL,
    mentioned_entity TEXT NOT NULL,
    raw_text         TEXT NOT NULL,
    confidence_score REAL NOT NULL,
    status           TEXT NOT NULL DEFAULT 'pending',
    created_at       TEXT NOT NULL,   -- ISO 8601 UTC; store-assigned
    post_id          TEXT,
    comment_id       TEXT
);

-- Accumulated statistics per ordered (source, mentioned) pair.
-- `cell_seq` records when the pair was first observed; top_pairs uses it
-- as the tie-break.
CREATE TABLE IF NOT EXISTS validation_cells (
    cell_seq           INTEGER PRIMARY KEY AUTOINCREMENT,
    source_entity      TEXT NOT NULL,
    mentioned_entity   TEXT NOT NULL,
    comment_count      INTEGER NOT NULL DEFAULT 0,
    verified_count     INTEGER NOT NULL DEFAULT 0,
    confidence_sum     REAL NOT NULL DEFAULT 0,
    average_confidence REAL NOT NULL DEFAULT 0,
    last_updated       TEXT,
    UNIQUE (source_entity, mentioned_entity)
);

CREATE INDEX IF NOT EXISTS records_source_idx
    ON validation_records(source_entity);
CREATE INDEX IF NOT EXISTS cells_count_idx
    ON validation_cells(comment_count);

PRAGMA user_version = 1;
";
