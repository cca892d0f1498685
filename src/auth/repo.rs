use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use time::OffsetDateTime;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub pseudonym: String,
    pub created_at: OffsetDateTime,
}

/// How an insert into `users` failed. Both unique columns matter to the
/// caller: a taken email is a user-facing error, a taken pseudonym means
/// the collision loop should try the next fingerprint.
#[derive(Debug)]
pub enum CreateUserError {
    DuplicateEmail,
    DuplicatePseudonym,
    Other(sqlx::Error),
}

impl From<sqlx::Error> for CreateUserError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db_err) = e.as_database_error() {
            if db_err.is_unique_violation() {
                let msg = db_err.message().to_string();
                if msg.contains("users.email") {
                    return CreateUserError::DuplicateEmail;
                }
                if msg.contains("users.pseudonym") {
                    return CreateUserError::DuplicatePseudonym;
                }
            }
        }
        CreateUserError::Other(e)
    }
}

impl User {
    pub async fn find_by_email(db: &SqlitePool, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, pseudonym, created_at
            FROM users
            WHERE email = ?1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await
    }

    pub async fn find_by_id(db: &SqlitePool, id: i64) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, pseudonym, created_at
            FROM users
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    pub async fn pseudonym_taken(db: &SqlitePool, pseudonym: &str) -> Result<bool, sqlx::Error> {
        let count: i64 =
            sqlx::query_scalar(r#"SELECT COUNT(*) FROM users WHERE pseudonym = ?1"#)
                .bind(pseudonym)
                .fetch_one(db)
                .await?;
        Ok(count > 0)
    }

    pub async fn create(
        db: &SqlitePool,
        email: &str,
        password_hash: &str,
        pseudonym: &str,
    ) -> Result<User, CreateUserError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, pseudonym, created_at)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING id, email, password_hash, pseudonym, created_at
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(pseudonym)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(db)
        .await?;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::test_pool;

    #[tokio::test]
    async fn create_and_find_by_email() {
        let db = test_pool().await;
        let user = User::create(&db, "a@example.com", "hash", "abcdef0123456789")
            .await
            .expect("create user");
        assert_eq!(user.email, "a@example.com");

        let found = User::find_by_email(&db, "a@example.com")
            .await
            .expect("query")
            .expect("user present");
        assert_eq!(found.id, user.id);
        assert_eq!(found.pseudonym, "abcdef0123456789");

        assert!(User::find_by_email(&db, "nobody@example.com")
            .await
            .expect("query")
            .is_none());
    }

    #[tokio::test]
    async fn duplicate_email_is_classified() {
        let db = test_pool().await;
        User::create(&db, "dup@example.com", "hash", "0000000000000001")
            .await
            .expect("first insert");
        let err = User::create(&db, "dup@example.com", "hash", "0000000000000002")
            .await
            .expect_err("second insert must fail");
        assert!(matches!(err, CreateUserError::DuplicateEmail));
    }

    #[tokio::test]
    async fn duplicate_pseudonym_is_classified() {
        let db = test_pool().await;
        User::create(&db, "one@example.com", "hash", "feedfeedfeedfeed")
            .await
            .expect("first insert");
        let err = User::create(&db, "two@example.com", "hash", "feedfeedfeedfeed")
            .await
            .expect_err("pseudonym collision must fail");
        assert!(matches!(err, CreateUserError::DuplicatePseudonym));
    }

    #[tokio::test]
    async fn password_hash_not_serialized() {
        let db = test_pool().await;
        let user = User::create(&db, "s@example.com", "topsecret", "1111111111111111")
            .await
            .expect("create user");
        let json = serde_json::to_string(&user).expect("serialize");
        assert!(!json.contains("topsecret"));
        assert!(json.contains("s@example.com"));
    }
}
