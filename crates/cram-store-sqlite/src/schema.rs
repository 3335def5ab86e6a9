//! SQL schema for the Cram SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- ── Auth bookkeeping ─────────────────────────────────────────────────────

CREATE TABLE IF NOT EXISTS users (
    id             TEXT PRIMARY KEY,
    email          TEXT NOT NULL UNIQUE,
    name           TEXT,
    image          TEXT,
    email_verified TEXT              -- RFC 3339 UTC or NULL
);

CREATE TABLE IF NOT EXISTS accounts (
    id                  TEXT PRIMARY KEY,
    user_id             TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    type                TEXT NOT NULL,
    provider            TEXT NOT NULL,
    provider_account_id TEXT NOT NULL,
    refresh_token       TEXT,
    access_token        TEXT,
    expires_at          INTEGER,
    token_type          TEXT,
    scope               TEXT,
    id_token            TEXT,
    session_state       TEXT,
    UNIQUE (provider, provider_account_id)
);

CREATE TABLE IF NOT EXISTS sessions (
    id            TEXT PRIMARY KEY,
    session_token TEXT NOT NULL UNIQUE,
    user_id       TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    expires       TEXT NOT NULL
);

-- ── Study material ───────────────────────────────────────────────────────
-- Rows are written once and never updated.

CREATE TABLE IF NOT EXISTS summaries (
    id          TEXT PRIMARY KEY,
    user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    title       TEXT NOT NULL,
    content     TEXT NOT NULL,
    source_type TEXT NOT NULL CHECK (source_type IN ('file', 'text')),
    source_data TEXT NOT NULL,
    created_at  TEXT NOT NULL    -- fixed-width RFC 3339 UTC; sorts lexically
);

CREATE TABLE IF NOT EXISTS quizzes (
    id          TEXT PRIMARY KEY,
    user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    title       TEXT NOT NULL,
    source_type TEXT NOT NULL CHECK (source_type IN ('file', 'text')),
    source_data TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS questions (
    id             TEXT PRIMARY KEY,
    quiz_id        TEXT NOT NULL REFERENCES quizzes(id) ON DELETE CASCADE,
    question       TEXT NOT NULL,
    options_json   TEXT NOT NULL,   -- JSON array of strings
    correct_answer TEXT NOT NULL,
    explanation    TEXT NOT NULL,
    position       INTEGER NOT NULL CHECK (position >= 0),
    UNIQUE (quiz_id, position)
);

CREATE TABLE IF NOT EXISTS flashcard_sets (
    id          TEXT PRIMARY KEY,
    user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    title       TEXT NOT NULL,
    source_type TEXT NOT NULL CHECK (source_type IN ('file', 'text')),
    source_data TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS flashcards (
    id       TEXT PRIMARY KEY,
    set_id   TEXT NOT NULL REFERENCES flashcard_sets(id) ON DELETE CASCADE,
    front    TEXT NOT NULL,
    back     TEXT NOT NULL,
    position INTEGER NOT NULL CHECK (position >= 0),
    UNIQUE (set_id, position)
);

CREATE INDEX IF NOT EXISTS accounts_user_idx       ON accounts(user_id);
CREATE INDEX IF NOT EXISTS sessions_user_idx       ON sessions(user_id);
CREATE INDEX IF NOT EXISTS summaries_user_idx      ON summaries(user_id, created_at);
CREATE INDEX IF NOT EXISTS quizzes_user_idx        ON quizzes(user_id, created_at);
CREATE INDEX IF NOT EXISTS flashcard_sets_user_idx ON flashcard_sets(user_id, created_at);

PRAGMA user_version = 1;
";
