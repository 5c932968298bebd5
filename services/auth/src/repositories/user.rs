//! User repository for database operations

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use common::error::is_unique_violation;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::{
    error::AuthError,
    models::{NewUser, User},
};

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new user, hashing the password with a fresh salt
    ///
    /// A concurrent registration that slips past [`Self::exists`] still
    /// surfaces as [`AuthError::Conflict`] through the UNIQUE constraints.
    pub async fn create(&self, new_user: &NewUser) -> Result<User, AuthError> {
        info!("Creating new user: {}", new_user.name);

        let salt = SaltString::generate(&mut rand::thread_rng());
        let password_hash = Argon2::default()
            .hash_password(new_user.password.as_bytes(), &salt)
            .map_err(|e| AuthError::Hashing(e.to_string()))?
            .to_string();

        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash)
            VALUES (?, ?, ?)
            RETURNING id, name, email, password_hash
            "#,
        )
        .bind(&new_user.name)
        .bind(&new_user.email)
        .bind(&password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AuthError::Conflict
            } else {
                AuthError::Database(e)
            }
        })
    }

    /// Whether a user with this name or this email is already registered
    pub async fn exists(&self, name: &str, email: &str) -> Result<bool, AuthError> {
        let found: Option<i64> =
            sqlx::query_scalar("SELECT id FROM users WHERE name = ? OR email = ? LIMIT 1")
                .bind(name)
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;

        Ok(found.is_some())
    }

    /// Find a user by name
    pub async fn find_by_name(&self, name: &str) -> Result<Option<User>, AuthError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash
            FROM users
            WHERE name = ?
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Verify a user's password
    pub fn verify_password(&self, user: &User, password: &str) -> bool {
        let parsed_hash = match PasswordHash::new(&user.password_hash) {
            Ok(hash) => hash,
            Err(e) => {
                warn!("Stored password hash for user {} is unreadable: {}", user.id, e);
                return false;
            }
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::database::init_memory_pool;

    fn new_user(name: &str, email: &str) -> NewUser {
        NewUser {
            name: name.to_string(),
            email: email.to_string(),
            password: "pw123".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_hashes_password() {
        let repo = UserRepository::new(init_memory_pool().await.unwrap());

        let user = repo.create(&new_user("alice", "a@x.com")).await.unwrap();
        assert!(user.id > 0);
        assert_ne!(user.password_hash, "pw123");
        assert!(user.password_hash.starts_with("$argon2"));

        assert!(repo.verify_password(&user, "pw123"));
        assert!(!repo.verify_password(&user, "wrong"));
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_conflict() {
        let repo = UserRepository::new(init_memory_pool().await.unwrap());
        repo.create(&new_user("alice", "a@x.com")).await.unwrap();

        let err = repo
            .create(&new_user("alice", "b@x.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Conflict));
    }

    #[tokio::test]
    async fn test_exists_matches_name_or_email() {
        let repo = UserRepository::new(init_memory_pool().await.unwrap());
        repo.create(&new_user("alice", "a@x.com")).await.unwrap();

        assert!(repo.exists("alice", "new@x.com").await.unwrap());
        assert!(repo.exists("bob", "a@x.com").await.unwrap());
        assert!(!repo.exists("bob", "b@x.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_find_by_name() {
        let repo = UserRepository::new(init_memory_pool().await.unwrap());
        let created = repo.create(&new_user("alice", "a@x.com")).await.unwrap();

        let by_name = repo.find_by_name("alice").await.unwrap().unwrap();
        assert_eq!(by_name.id, created.id);
        assert_eq!(by_name.email, "a@x.com");

        assert!(repo.find_by_name("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unreadable_hash_never_verifies() {
        let repo = UserRepository::new(init_memory_pool().await.unwrap());
        let user = User {
            id: 1,
            name: "legacy".to_string(),
            email: "l@x.com".to_string(),
            password_hash: "$2a$10$not-an-argon-hash".to_string(),
        };
        assert!(!repo.verify_password(&user, "anything"));
    }
}
