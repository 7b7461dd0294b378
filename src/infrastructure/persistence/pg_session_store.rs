use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::instrument;

use crate::application::ports::{RepositoryError, SessionStore};
use crate::domain::{AuthSession, SessionToken, UserId};

pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn query_failed(e: sqlx::Error) -> RepositoryError {
    RepositoryError::QueryFailed(e.to_string())
}

#[async_trait]
impl SessionStore for PgSessionStore {
    #[instrument(skip(self, session), fields(user_id = %session.user_id))]
    async fn insert(&self, session: &AuthSession) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO auth_sessions (token, user_id, created_at, expires_at) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(session.token.as_str())
        .bind(session.user_id.as_uuid())
        .bind(session.created_at)
        .bind(session.expires_at)
        .execute(&self.pool)
        .await
        .map_err(query_failed)?;

        Ok(())
    }

    #[instrument(skip(self, token))]
    async fn get(&self, token: &SessionToken) -> Result<Option<AuthSession>, RepositoryError> {
        let row = sqlx::query(
            "SELECT token, user_id, created_at, expires_at FROM auth_sessions WHERE token = $1",
        )
        .bind(token.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(query_failed)?;

        match row {
            Some(r) => {
                let raw: String = r.try_get("token").map_err(query_failed)?;
                let token = SessionToken::parse(&raw)
                    .ok_or_else(|| RepositoryError::QueryFailed("malformed token".to_string()))?;
                Ok(Some(AuthSession {
                    token,
                    user_id: UserId::from_uuid(r.try_get("user_id").map_err(query_failed)?),
                    created_at: r.try_get("created_at").map_err(query_failed)?,
                    expires_at: r.try_get("expires_at").map_err(query_failed)?,
                }))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self, token))]
    async fn extend(
        &self,
        token: &SessionToken,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE auth_sessions SET expires_at = $2 WHERE token = $1")
            .bind(token.as_str())
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(query_failed)?;

        Ok(())
    }

    #[instrument(skip(self, token))]
    async fn remove(&self, token: &SessionToken) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM auth_sessions WHERE token = $1")
            .bind(token.as_str())
            .execute(&self.pool)
            .await
            .map_err(query_failed)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM auth_sessions WHERE expires_at < $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(query_failed)?;

        Ok(result.rows_affected())
    }
}
