use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

use crate::application::ports::{RepositoryError, UserRepository};
use crate::domain::{OtpChallenge, User, UserId};

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const USER_COLUMNS: &str = "id, google_id, name, email, picture, password_hash, \
     is_email_verified, otp_code, otp_expires_at, last_login_at, created_at, updated_at";

fn query_failed(e: sqlx::Error) -> RepositoryError {
    RepositoryError::QueryFailed(e.to_string())
}

fn user_from_row(row: &PgRow) -> Result<User, RepositoryError> {
    let otp_code: Option<String> = row.try_get("otp_code").map_err(query_failed)?;
    let otp_expires_at: Option<DateTime<Utc>> =
        row.try_get("otp_expires_at").map_err(query_failed)?;
    let otp = match (otp_code, otp_expires_at) {
        (Some(code), Some(expires_at)) => Some(OtpChallenge { code, expires_at }),
        _ => None,
    };

    Ok(User {
        id: UserId::from_uuid(row.try_get("id").map_err(query_failed)?),
        google_id: row.try_get("google_id").map_err(query_failed)?,
        name: row.try_get("name").map_err(query_failed)?,
        email: row.try_get("email").map_err(query_failed)?,
        picture: row.try_get("picture").map_err(query_failed)?,
        password_hash: row.try_get("password_hash").map_err(query_failed)?,
        is_email_verified: row.try_get("is_email_verified").map_err(query_failed)?,
        otp,
        last_login_at: row.try_get("last_login_at").map_err(query_failed)?,
        created_at: row.try_get("created_at").map_err(query_failed)?,
        updated_at: row.try_get("updated_at").map_err(query_failed)?,
    })
}

#[async_trait]
impl UserRepository for PgUserRepository {
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn create(&self, user: &User) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO users (id, google_id, name, email, picture, password_hash, \
             is_email_verified, otp_code, otp_expires_at, last_login_at, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(user.id.as_uuid())
        .bind(&user.google_id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.picture)
        .bind(&user.password_hash)
        .bind(user.is_email_verified)
        .bind(user.otp.as_ref().map(|c| c.code.clone()))
        .bind(user.otp.as_ref().map(|c| c.expires_at))
        .bind(user.last_login_at)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if e.as_database_error().is_some_and(|d| d.is_unique_violation()) => {
                Err(RepositoryError::ConstraintViolation(e.to_string()))
            }
            Err(e) => Err(query_failed(e)),
        }
    }

    #[instrument(skip(self), fields(user_id = %id))]
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(query_failed)?;

        row.as_ref().map(user_from_row).transpose()
    }

    #[instrument(skip(self, email))]
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(query_failed)?;

        row.as_ref().map(user_from_row).transpose()
    }

    #[instrument(skip(self, google_id))]
    async fn find_by_google_id(&self, google_id: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM users WHERE google_id = $1",
            USER_COLUMNS
        ))
        .bind(google_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(query_failed)?;

        row.as_ref().map(user_from_row).transpose()
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn update(&self, user: &User) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE users SET google_id = $2, name = $3, email = $4, picture = $5, \
             password_hash = $6, is_email_verified = $7, otp_code = $8, otp_expires_at = $9, \
             last_login_at = $10, updated_at = $11 WHERE id = $1",
        )
        .bind(user.id.as_uuid())
        .bind(&user.google_id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.picture)
        .bind(&user.password_hash)
        .bind(user.is_email_verified)
        .bind(user.otp.as_ref().map(|c| c.code.clone()))
        .bind(user.otp.as_ref().map(|c| c.expires_at))
        .bind(user.last_login_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(r) if r.rows_affected() == 0 => {
                Err(RepositoryError::NotFound(user.id.to_string()))
            }
            Ok(_) => Ok(()),
            Err(e) if e.as_database_error().is_some_and(|d| d.is_unique_violation()) => {
                Err(RepositoryError::ConstraintViolation(e.to_string()))
            }
            Err(e) => Err(query_failed(e)),
        }
    }
}
