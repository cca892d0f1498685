use lazy_static::lazy_static;
use regex::Regex;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::auth::password::{hash_password, verify_password};
use crate::auth::pseudonym::{self, fingerprint};
use crate::auth::repo::{CreateUserError, User};
use crate::auth::session::Session;
use crate::error::AppError;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Passwords must be longer than 4 characters and match their confirmation.
fn check_password(password: &str, confirm: &str) -> Result<(), AppError> {
    if password != confirm || password.chars().count() <= 4 {
        return Err(AppError::WeakPassword);
    }
    Ok(())
}

pub async fn register(
    db: &SqlitePool,
    email: &str,
    password: &str,
    password_confirm: &str,
) -> Result<User, AppError> {
    let email = email.trim().to_lowercase();

    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(AppError::InvalidEmail);
    }
    check_password(password, password_confirm)?;

    if User::find_by_email(db, &email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(AppError::DuplicateEmail);
    }

    let hash = hash_password(password)?;

    // The pseudonym is derived from the email; on collision the attempt
    // counter varies the fingerprint until a free one is found. The insert
    // itself is the authority, so a concurrent registration landing on the
    // same pseudonym just moves us to the next attempt.
    for attempt in 0..pseudonym::MAX_ATTEMPTS {
        let pseudo = fingerprint(&email, attempt);
        if User::pseudonym_taken(db, &pseudo).await? {
            continue;
        }
        match User::create(db, &email, &hash, &pseudo).await {
            Ok(user) => {
                info!(user_id = user.id, pseudonym = %user.pseudonym, "user registered");
                return Ok(user);
            }
            Err(CreateUserError::DuplicateEmail) => return Err(AppError::DuplicateEmail),
            Err(CreateUserError::DuplicatePseudonym) => continue,
            Err(CreateUserError::Other(e)) => return Err(AppError::Storage(e)),
        }
    }

    Err(AppError::Internal(anyhow::anyhow!(
        "pseudonym space exhausted for {email}"
    )))
}

pub async fn login(
    db: &SqlitePool,
    email: &str,
    password: &str,
    session_ttl_minutes: i64,
) -> Result<(Session, User), AppError> {
    let email = email.trim().to_lowercase();

    // Unknown email and wrong password are indistinguishable to the caller.
    let user = match User::find_by_email(db, &email).await? {
        Some(u) => u,
        None => {
            warn!(email = %email, "login unknown email");
            return Err(AppError::InvalidCredentials);
        }
    };

    if !verify_password(password, &user.password_hash)? {
        warn!(user_id = user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    Session::purge_expired(db).await?;
    let session = Session::create(db, user.id, session_ttl_minutes).await?;
    info!(user_id = user.id, "user logged in");
    Ok((session, user))
}

pub async fn current_user(db: &SqlitePool, token: &str) -> Result<Option<User>, AppError> {
    let Some(session) = Session::find_valid(db, token).await? else {
        return Ok(None);
    };
    Ok(User::find_by_id(db, session.user_id).await?)
}

pub async fn logout(db: &SqlitePool, token: &str) -> Result<(), AppError> {
    Session::delete(db, token).await?;
    Ok(())
}

/// Ownership gate for personal recipes: the acting user's pseudonym must
/// equal the stored owner value.
pub fn require_ownership(acting_pseudonym: &str, owner: &str) -> Result<(), AppError> {
    if acting_pseudonym != owner {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::pseudonym::PSEUDONYM_LEN;
    use crate::state::test_support::test_pool;

    #[tokio::test]
    async fn register_derives_pseudonym() {
        let db = test_pool().await;
        let user = register(&db, "Alice@Example.com", "secret1", "secret1")
            .await
            .expect("register");
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.pseudonym, fingerprint("alice@example.com", 0));
        assert_eq!(user.pseudonym.len(), PSEUDONYM_LEN);
    }

    #[tokio::test]
    async fn register_rejects_duplicate_email() {
        let db = test_pool().await;
        register(&db, "dup@example.com", "secret1", "secret1")
            .await
            .expect("first register");
        let err = register(&db, "dup@example.com", "secret2", "secret2")
            .await
            .expect_err("duplicate");
        assert!(matches!(err, AppError::DuplicateEmail));
    }

    #[tokio::test]
    async fn register_rejects_weak_passwords() {
        let db = test_pool().await;
        // Too short: exactly 4 characters is not enough.
        let err = register(&db, "w@example.com", "abcd", "abcd")
            .await
            .expect_err("short password");
        assert!(matches!(err, AppError::WeakPassword));

        // Confirmation mismatch.
        let err = register(&db, "w@example.com", "abcde", "abcdX")
            .await
            .expect_err("mismatch");
        assert!(matches!(err, AppError::WeakPassword));

        let err = register(&db, "not-an-email", "abcde", "abcde")
            .await
            .expect_err("bad email");
        assert!(matches!(err, AppError::InvalidEmail));
    }

    #[tokio::test]
    async fn register_sidesteps_pseudonym_collision() {
        let db = test_pool().await;
        // Occupy victim's canonical fingerprint with another account.
        let taken = fingerprint("victim@example.com", 0);
        crate::auth::repo::User::create(&db, "squatter@example.com", "hash", &taken)
            .await
            .expect("squatter");

        let user = register(&db, "victim@example.com", "secret1", "secret1")
            .await
            .expect("register despite collision");
        assert_ne!(user.pseudonym, taken);
        assert_eq!(user.pseudonym, fingerprint("victim@example.com", 1));
    }

    #[tokio::test]
    async fn login_roundtrip_and_current_user() {
        let db = test_pool().await;
        let registered = register(&db, "log@example.com", "secret1", "secret1")
            .await
            .expect("register");

        let (session, user) = login(&db, "log@example.com", "secret1", 60)
            .await
            .expect("login");
        assert_eq!(user.id, registered.id);

        let resolved = current_user(&db, &session.token)
            .await
            .expect("resolve")
            .expect("session maps to user");
        assert_eq!(resolved.id, registered.id);

        logout(&db, &session.token).await.expect("logout");
        assert!(current_user(&db, &session.token)
            .await
            .expect("resolve after logout")
            .is_none());
        // Logging out twice is fine.
        logout(&db, &session.token).await.expect("logout again");
    }

    #[tokio::test]
    async fn login_sweeps_expired_sessions() {
        let db = test_pool().await;
        let registered = register(&db, "sweep@example.com", "secret1", "secret1")
            .await
            .expect("register");
        let stale = Session::create(&db, registered.id, -1).await.expect("stale");

        let (fresh, _) = login(&db, "sweep@example.com", "secret1", 60)
            .await
            .expect("login");

        let tokens: Vec<String> = sqlx::query_scalar("SELECT token FROM sessions")
            .fetch_all(&db)
            .await
            .expect("tokens");
        assert!(!tokens.contains(&stale.token));
        assert!(tokens.contains(&fresh.token));
    }

    #[tokio::test]
    async fn login_failures_are_uniform() {
        let db = test_pool().await;
        register(&db, "u@example.com", "secret1", "secret1")
            .await
            .expect("register");

        let err = login(&db, "u@example.com", "wrong", 60)
            .await
            .expect_err("bad password");
        assert!(matches!(err, AppError::InvalidCredentials));

        let err = login(&db, "ghost@example.com", "secret1", 60)
            .await
            .expect_err("unknown email");
        assert!(matches!(err, AppError::InvalidCredentials));
    }

    #[test]
    fn ownership_gate() {
        assert!(require_ownership("aaaa", "aaaa").is_ok());
        assert!(matches!(
            require_ownership("aaaa", "bbbb"),
            Err(AppError::Forbidden)
        ));
    }
}
