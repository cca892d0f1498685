use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use time::{Duration, OffsetDateTime};
use tracing::warn;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

/// Server-side session row. The token is opaque to clients; logging out
/// deletes the row, which is how invalidation actually works.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    pub token: String,
    pub user_id: i64,
    pub created_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
}

impl Session {
    pub async fn create(
        db: &SqlitePool,
        user_id: i64,
        ttl_minutes: i64,
    ) -> Result<Session, sqlx::Error> {
        let now = OffsetDateTime::now_utc();
        let session = Session {
            token: Uuid::new_v4().simple().to_string(),
            user_id,
            created_at: now,
            expires_at: now + Duration::minutes(ttl_minutes),
        };
        sqlx::query(
            r#"
            INSERT INTO sessions (token, user_id, created_at, expires_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&session.token)
        .bind(session.user_id)
        .bind(session.created_at)
        .bind(session.expires_at)
        .execute(db)
        .await?;
        Ok(session)
    }

    /// Resolve a token to a live session; expired rows count as absent.
    pub async fn find_valid(db: &SqlitePool, token: &str) -> Result<Option<Session>, sqlx::Error> {
        sqlx::query_as::<_, Session>(
            r#"
            SELECT token, user_id, created_at, expires_at
            FROM sessions
            WHERE token = ?1 AND expires_at > ?2
            "#,
        )
        .bind(token)
        .bind(OffsetDateTime::now_utc())
        .fetch_optional(db)
        .await
    }

    /// Idempotent: deleting an unknown token is not an error.
    pub async fn delete(db: &SqlitePool, token: &str) -> Result<(), sqlx::Error> {
        sqlx::query(r#"DELETE FROM sessions WHERE token = ?1"#)
            .bind(token)
            .execute(db)
            .await?;
        Ok(())
    }

    /// Drop rows that can no longer resolve. Called opportunistically on
    /// login so the table does not accumulate dead sessions.
    pub async fn purge_expired(db: &SqlitePool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(r#"DELETE FROM sessions WHERE expires_at <= ?1"#)
            .bind(OffsetDateTime::now_utc())
            .execute(db)
            .await?;
        Ok(result.rows_affected())
    }
}

/// Identity of the acting user, resolved from a valid session.
#[derive(Debug, Clone, FromRow)]
pub struct CurrentUser {
    pub id: i64,
    pub pseudonym: String,
}

pub(crate) fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let header = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::Unauthorized)?;
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .ok_or(AppError::Unauthorized)
}

/// Extracts the session token without touching the database. Used by
/// logout, which only needs the token itself.
pub struct BearerToken(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(BearerToken(bearer_token(parts)?.to_string()))
    }
}

/// Extracts and validates the session, returning the acting user.
pub struct AuthUser(pub CurrentUser);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;

        let user = sqlx::query_as::<_, CurrentUser>(
            r#"
            SELECT u.id, u.pseudonym
            FROM sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.token = ?1 AND s.expires_at > ?2
            "#,
        )
        .bind(token)
        .bind(OffsetDateTime::now_utc())
        .fetch_optional(&state.db)
        .await
        .map_err(AppError::Storage)?;

        match user {
            Some(user) => Ok(AuthUser(user)),
            None => {
                warn!("invalid or expired session token");
                Err(AppError::Unauthorized)
            }
        }
    }
}
