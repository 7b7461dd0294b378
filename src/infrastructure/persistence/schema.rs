use sqlx::PgPool;

use crate::application::ports::RepositoryError;

/// Idempotent DDL applied at startup. Single-row writes give the
/// per-record atomicity the service relies on; no multi-row transactions
/// are used anywhere.
const CREATE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id UUID PRIMARY KEY,
    google_id TEXT UNIQUE,
    name TEXT NOT NULL,
    email TEXT UNIQUE,
    picture TEXT,
    password_hash TEXT,
    is_email_verified BOOLEAN NOT NULL DEFAULT FALSE,
    otp_code TEXT,
    otp_expires_at TIMESTAMPTZ,
    last_login_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
);

CREATE TABLE IF NOT EXISTS transcripts (
    id UUID PRIMARY KEY,
    owner_id UUID NOT NULL REFERENCES users(id),
    text TEXT NOT NULL,
    filename TEXT,
    language TEXT NOT NULL,
    duration_minutes BIGINT NOT NULL,
    cost DOUBLE PRECISION NOT NULL,
    file_size_bytes BIGINT,
    processing_seconds BIGINT,
    created_at TIMESTAMPTZ NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_transcripts_owner_created
    ON transcripts(owner_id, created_at DESC);

CREATE TABLE IF NOT EXISTS auth_sessions (
    token TEXT PRIMARY KEY,
    user_id UUID NOT NULL REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL,
    expires_at TIMESTAMPTZ NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_auth_sessions_expires
    ON auth_sessions(expires_at);
"#;

pub async fn run_migrations(pool: &PgPool) -> Result<(), RepositoryError> {
    sqlx::raw_sql(CREATE_TABLES)
        .execute(pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(format!("schema: {}", e)))?;
    tracing::info!("Database schema ensured");
    Ok(())
}
