//! User registration and credential verification. The secret is stored as an
//! argon2 hash; authentication middleware itself lives outside this core and
//! only consumes `verify_credentials`.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::user::{NewUser, User};
use crate::utils::error::{AppError, AppResult};

pub async fn register(pool: &SqlitePool, req: NewUser, now: DateTime<Utc>) -> AppResult<User> {
    let username = req.username.trim().to_string();
    let email = req.email.trim().to_string();
    if username.is_empty() {
        return Err(AppError::InvalidRequest(
            "username must not be empty".to_string(),
        ));
    }
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::InvalidRequest(
            "a valid email address is required".to_string(),
        ));
    }
    if req.password.is_empty() {
        return Err(AppError::InvalidRequest(
            "password must not be empty".to_string(),
        ));
    }

    let password_hash = hash_password(&req.password)?;

    let user = User {
        id: Uuid::new_v4(),
        username,
        email,
        password_hash,
        is_admin: req.is_admin,
        created_at: now,
        updated_at: now,
    };

    let inserted = sqlx::query(
        "INSERT INTO users (id, username, email, password_hash, is_admin, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )
    .bind(user.id)
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(user.is_admin)
    .bind(user.created_at)
    .bind(user.updated_at)
    .execute(pool)
    .await;

    match inserted {
        Ok(_) => {}
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
            return Err(AppError::Conflict(
                "username or email is already taken".to_string(),
            ));
        }
        Err(e) => return Err(e.into()),
    }

    tracing::info!(user_id = %user.id, "user registered");

    Ok(user)
}

/// Looks up a user by username and checks the password. Returns `None` for an
/// unknown user or a wrong password; the caller decides how to respond.
pub async fn verify_credentials(
    pool: &SqlitePool,
    username: &str,
    password: &str,
) -> AppResult<Option<User>> {
    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE username = ?1")
        .bind(username)
        .fetch_optional(pool)
        .await?;

    Ok(user.filter(|u| verify_password(password, &u.password_hash)))
}

fn hash_password(password: &str) -> AppResult<String> {
    use argon2::password_hash::rand_core::OsRng;
    use argon2::password_hash::SaltString;
    use argon2::{Argon2, PasswordHasher};

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::InvalidRequest(format!("unusable password: {e}")))?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};

    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;

    fn alice() -> NewUser {
        NewUser {
            username: "alice".into(),
            email: "alice@example.com".into(),
            password: "s3cret".into(),
            is_admin: false,
        }
    }

    #[tokio::test]
    async fn registration_hashes_the_password() {
        let pool = catalog::test_pool().await;
        let user = register(&pool, alice(), Utc::now()).await.unwrap();
        assert_ne!(user.password_hash, "s3cret");
        assert!(user.password_hash.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn duplicate_username_or_email_conflicts() {
        let pool = catalog::test_pool().await;
        register(&pool, alice(), Utc::now()).await.unwrap();

        let err = register(&pool, alice(), Utc::now()).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let mut same_email = alice();
        same_email.username = "alice2".into();
        let err = register(&pool, same_email, Utc::now()).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn credentials_verify_only_with_the_right_password() {
        let pool = catalog::test_pool().await;
        register(&pool, alice(), Utc::now()).await.unwrap();

        let user = verify_credentials(&pool, "alice", "s3cret").await.unwrap();
        assert!(user.is_some());

        let wrong = verify_credentials(&pool, "alice", "nope").await.unwrap();
        assert!(wrong.is_none());

        let unknown = verify_credentials(&pool, "bob", "s3cret").await.unwrap();
        assert!(unknown.is_none());
    }

    #[tokio::test]
    async fn malformed_email_is_invalid() {
        let pool = catalog::test_pool().await;
        let mut req = alice();
        req.email = "not-an-email".into();
        let err = register(&pool, req, Utc::now()).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
    }
}
