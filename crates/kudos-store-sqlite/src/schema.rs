//! SQL schema for the kudos SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! the `user_version` number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS learners (
    learner_id  TEXT PRIMARY KEY,
    guardian_id TEXT NOT NULL,
    name        TEXT,
    created_at  TEXT NOT NULL
);

-- One row per learner, created together with the learner row. Both counters
-- only ever grow; the CHECK backs the balance >= 0 invariant that the
-- purchase transaction enforces.
CREATE TABLE IF NOT EXISTS ledgers (
    learner_id TEXT PRIMARY KEY REFERENCES learners(learner_id),
    earned     INTEGER NOT NULL DEFAULT 0,
    spent      INTEGER NOT NULL DEFAULT 0,
    CHECK (earned >= 0 AND spent >= 0 AND spent <= earned)
);

-- Completion is monotonic: completed transitions 0 -> 1 exactly once.
-- Unenrolling deletes the row; attempts and orders below are not cascaded.
CREATE TABLE IF NOT EXISTS enrollments (
    learner_id   TEXT NOT NULL REFERENCES learners(learner_id),
    course_id    TEXT NOT NULL,
    enrolled_at  TEXT NOT NULL,
    completed    INTEGER NOT NULL DEFAULT 0,
    completed_at TEXT,
    PRIMARY KEY (learner_id, course_id)
);

-- Attempts are strictly append-only and survive unenrolment.
CREATE TABLE IF NOT EXISTS quiz_attempts (
    attempt_id   TEXT PRIMARY KEY,
    learner_id   TEXT NOT NULL REFERENCES learners(learner_id),
    quiz_id      TEXT NOT NULL,
    attempted_at TEXT NOT NULL,
    score        INTEGER NOT NULL,
    passed       INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS prize_items (
    item_id     TEXT PRIMARY KEY,
    guardian_id TEXT NOT NULL,
    name        TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    cost        INTEGER NOT NULL CHECK (cost > 0)
);

-- Append-only purchase log. item_id carries no foreign key: a guardian may
-- delete a shop item while past orders for it remain on record, and cost is
-- snapshotted here so catalog edits cannot rewrite history.
CREATE TABLE IF NOT EXISTS prize_orders (
    order_id   TEXT PRIMARY KEY,
    learner_id TEXT NOT NULL REFERENCES learners(learner_id),
    item_id    TEXT NOT NULL,
    cost       INTEGER NOT NULL,
    ordered_at TEXT NOT NULL
);

-- The audit trail. No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS statements (
    statement_id TEXT PRIMARY KEY,
    actor_id     TEXT NOT NULL,
    verb         TEXT NOT NULL,   -- 'completed' | 'attempted' | 'redeemed'
    object_type  TEXT NOT NULL,   -- 'course' | 'quiz' | 'prize'
    object_id    TEXT NOT NULL,
    result_json  TEXT NOT NULL,
    recorded_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS learners_guardian_idx ON learners(guardian_id);
CREATE INDEX IF NOT EXISTS attempts_learner_quiz_idx
    ON quiz_attempts(learner_id, quiz_id, attempted_at);
CREATE INDEX IF NOT EXISTS items_guardian_idx    ON prize_items(guardian_id);
CREATE INDEX IF NOT EXISTS orders_learner_idx    ON prize_orders(learner_id);
CREATE INDEX IF NOT EXISTS statements_actor_idx  ON statements(actor_id, recorded_at);

PRAGMA user_version = 1;
";
