//! SQL schema for the GuessShot SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- One row per chat identity; never deleted.
CREATE TABLE IF NOT EXISTS users (
    user_id            INTEGER PRIMARY KEY,
    display_name       TEXT,
    locale             TEXT    NOT NULL,
    utc_offset_minutes INTEGER NOT NULL,
    score              INTEGER NOT NULL DEFAULT 0,
    streak             INTEGER NOT NULL DEFAULT 0,
    games_played       INTEGER NOT NULL DEFAULT 0,
    referrer_id        INTEGER REFERENCES users(user_id),
    referral_count     INTEGER NOT NULL DEFAULT 0,
    created_at         TEXT    NOT NULL,
    CHECK (games_played >= score)
);

-- The answer ledger is strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS answers (
    attempt_id  TEXT    PRIMARY KEY,
    user_id     INTEGER NOT NULL REFERENCES users(user_id),
    question_id INTEGER NOT NULL,
    topic       TEXT    NOT NULL,
    is_correct  INTEGER NOT NULL,   -- 0 | 1
    answered_at TEXT    NOT NULL,   -- RFC 3339 UTC, fixed width
    local_day   TEXT    NOT NULL,   -- YYYY-MM-DD in the user's offset
    UNIQUE (user_id, question_id, topic, local_day)
);

-- Badges only accumulate. Display order is (awarded_at, rowid).
CREATE TABLE IF NOT EXISTS badges (
    user_id    INTEGER NOT NULL REFERENCES users(user_id),
    badge_id   TEXT    NOT NULL,
    awarded_at TEXT    NOT NULL,
    PRIMARY KEY (user_id, badge_id)
);

-- Append-only delivery history. A question goes to a user once per topic.
CREATE TABLE IF NOT EXISTS deliveries (
    delivery_id TEXT    PRIMARY KEY,
    user_id     INTEGER NOT NULL REFERENCES users(user_id),
    question_id INTEGER NOT NULL,
    topic       TEXT    NOT NULL,
    sent_at     TEXT    NOT NULL,
    UNIQUE (user_id, topic, question_id)
);

CREATE INDEX IF NOT EXISTS answers_user_day_idx    ON answers(user_id, local_day);
CREATE INDEX IF NOT EXISTS answers_answered_idx    ON answers(answered_at);

PRAGMA user_version = 1;
";
