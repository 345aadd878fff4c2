//! Authentication service.
//!
//! Orchestrates the credential store, password hasher, and token issuer
//! for registration and login.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use shoplink_core::Email;

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::user::User;
use crate::services::token::TokenService;

/// Authentication service.
///
/// Handles user registration and login.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    tokens: &'a TokenService,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, tokens: &'a TokenService) -> Self {
        Self {
            users: UserRepository::new(pool),
            tokens,
        }
    }

    /// Register a new user with email and password.
    ///
    /// The existence check is a fast path only; the `users.email` unique
    /// constraint is authoritative, so two concurrent registrations with
    /// the same email still resolve to exactly one success and one
    /// conflict.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserAlreadyExists` if the email is already
    /// registered, `AuthError::PasswordHash` if hashing fails, and
    /// `AuthError::Repository` for database failures.
    pub async fn register(&self, email: &Email, password: &str) -> Result<User, AuthError> {
        if self.users.exists(email).await? {
            return Err(AuthError::UserAlreadyExists);
        }

        let password_hash = hash_password(password.to_owned()).await?;

        let user = self
            .users
            .create(email, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Login with email and password, minting a session token on success.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` whether the email is
    /// unknown or the password is wrong; the two cases are not
    /// distinguishable by the caller.
    pub async fn login(&self, email: &Email, password: &str) -> Result<String, AuthError> {
        let Some((user, password_hash)) = self.users.get_with_password(email).await? else {
            return Err(AuthError::InvalidCredentials);
        };

        verify_password(password.to_owned(), password_hash).await?;

        let token = self.tokens.issue(user.id)?;
        tracing::info!(user_id = %user.id, "user logged in");
        Ok(token)
    }
}

/// Hash a password with Argon2id on the blocking pool.
///
/// The KDF takes on the order of hundreds of milliseconds; it must never
/// run on the async scheduler.
async fn hash_password(password: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|_| AuthError::PasswordHash)
    })
    .await
    .map_err(|_| AuthError::PasswordHash)?
}

/// Verify a password against a stored hash on the blocking pool.
async fn verify_password(password: String, hash: String) -> Result<(), AuthError> {
    tokio::task::spawn_blocking(move || {
        let parsed_hash = PasswordHash::new(&hash).map_err(|_| AuthError::InvalidCredentials)?;
        let argon2 = Argon2::default();

        argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .map_err(|_| AuthError::InvalidCredentials)
    })
    .await
    .map_err(|_| AuthError::PasswordHash)?
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_then_verify() {
        let hash = hash_password("secret1".to_owned()).await.unwrap();
        assert_ne!(hash, "secret1");

        verify_password("secret1".to_owned(), hash).await.unwrap();
    }

    #[tokio::test]
    async fn test_verify_rejects_wrong_password() {
        let hash = hash_password("secret1".to_owned()).await.unwrap();

        let result = verify_password("wrong".to_owned(), hash).await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_hashes_are_salted() {
        let a = hash_password("secret1".to_owned()).await.unwrap();
        let b = hash_password("secret1".to_owned()).await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_verify_rejects_garbage_hash() {
        let result = verify_password("secret1".to_owned(), "not-a-hash".to_owned()).await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }
}
