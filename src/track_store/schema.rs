//! Database schema for tracks, transformations, jobs and profiles.
//!
//! One database holds everything:
//! - user / user_credentials / auth_token: identity and sessions
//! - track: uploaded source audio
//! - transformation: one row per (track, style), enforced by a unique index
//! - job: execution ledger, 1:1 with a transformation
//! - profile: per-user usage counters

/// SQL schema, applied with `execute_batch` on open.
pub const TRACK_SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS user (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    handle TEXT NOT NULL UNIQUE,
    created INTEGER NOT NULL DEFAULT (cast(strftime('%s','now') as int))
);

CREATE TABLE IF NOT EXISTS user_credentials (
    user_id INTEGER NOT NULL UNIQUE,
    hash TEXT NOT NULL,
    created INTEGER NOT NULL DEFAULT (cast(strftime('%s','now') as int)),
    FOREIGN KEY (user_id) REFERENCES user(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS auth_token (
    user_id INTEGER NOT NULL,
    value TEXT NOT NULL UNIQUE,
    created INTEGER NOT NULL DEFAULT (cast(strftime('%s','now') as int)),
    last_used INTEGER NOT NULL DEFAULT (cast(strftime('%s','now') as int)),
    FOREIGN KEY (user_id) REFERENCES user(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS track (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    name TEXT NOT NULL,
    file_path TEXT NOT NULL,
    duration_seconds REAL NOT NULL DEFAULT 0,
    file_size_mb REAL NOT NULL DEFAULT 0,

    -- Optional audio analysis fields, filled by an external analyzer
    tempo REAL,
    key TEXT,
    energy REAL,
    valence REAL,

    created INTEGER NOT NULL DEFAULT (cast(strftime('%s','now') as int)),
    updated INTEGER NOT NULL DEFAULT (cast(strftime('%s','now') as int)),
    FOREIGN KEY (user_id) REFERENCES user(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS transformation (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    track_id INTEGER NOT NULL,
    style TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending',
    output_path TEXT,
    processing_time_seconds REAL,
    error_message TEXT,

    -- Transform parameters, zero-valued until the external worker owns them
    tempo_shift REAL NOT NULL DEFAULT 0.0,
    pitch_shift REAL NOT NULL DEFAULT 0.0,
    reverb_amount REAL NOT NULL DEFAULT 0.0,
    filter_cutoff REAL NOT NULL DEFAULT 0.0,

    created INTEGER NOT NULL DEFAULT (cast(strftime('%s','now') as int)),
    updated INTEGER NOT NULL DEFAULT (cast(strftime('%s','now') as int)),
    FOREIGN KEY (track_id) REFERENCES track(id) ON DELETE CASCADE,
    UNIQUE (track_id, style)
);

CREATE TABLE IF NOT EXISTS job (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    transformation_id INTEGER NOT NULL UNIQUE,
    user_id INTEGER NOT NULL,
    job_id TEXT NOT NULL UNIQUE,
    status TEXT NOT NULL DEFAULT 'queued',
    progress_percentage INTEGER NOT NULL DEFAULT 0,
    started_at INTEGER,
    completed_at INTEGER,
    error_details TEXT,
    created INTEGER NOT NULL DEFAULT (cast(strftime('%s','now') as int)),
    updated INTEGER NOT NULL DEFAULT (cast(strftime('%s','now') as int)),
    FOREIGN KEY (transformation_id) REFERENCES transformation(id) ON DELETE CASCADE,
    FOREIGN KEY (user_id) REFERENCES user(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS profile (
    user_id INTEGER NOT NULL UNIQUE,
    total_tracks_uploaded INTEGER NOT NULL DEFAULT 0,
    total_transformations INTEGER NOT NULL DEFAULT 0,
    total_processing_time REAL NOT NULL DEFAULT 0,
    monthly_uploads INTEGER NOT NULL DEFAULT 0,
    monthly_transformations INTEGER NOT NULL DEFAULT 0,
    subscription_tier TEXT NOT NULL DEFAULT 'free',
    created INTEGER NOT NULL DEFAULT (cast(strftime('%s','now') as int)),
    updated INTEGER NOT NULL DEFAULT (cast(strftime('%s','now') as int)),
    FOREIGN KEY (user_id) REFERENCES user(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_auth_token_value ON auth_token(value);
CREATE INDEX IF NOT EXISTS idx_track_user ON track(user_id);
CREATE INDEX IF NOT EXISTS idx_transformation_track ON transformation(track_id);
CREATE INDEX IF NOT EXISTS idx_job_user ON job(user_id);
CREATE INDEX IF NOT EXISTS idx_job_status ON job(status);
"#;
