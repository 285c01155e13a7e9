use anyhow::anyhow;
use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use async_trait::async_trait;
use rand::rngs::OsRng;
use std::sync::Arc;

use crate::error::ApiError;
use crate::store::{CredentialStore, StoredCredential};

/// Decides whether a non-empty username/password pair may log in.
#[async_trait]
pub trait CredentialPolicy: Send + Sync {
    async fn authenticate(&self, username: &str, password: &str) -> Result<bool, ApiError>;
}

/// Accepts every pair. Field presence is checked before the policy runs.
pub struct PresenceOnly;

#[async_trait]
impl CredentialPolicy for PresenceOnly {
    async fn authenticate(&self, _username: &str, _password: &str) -> Result<bool, ApiError> {
        Ok(true)
    }
}

/// The first login for a username stores an argon2 hash of its password.
/// Later logins must present the same password.
pub struct RegisterOnFirstLogin {
    store: Arc<dyn CredentialStore>,
}

impl RegisterOnFirstLogin {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CredentialPolicy for RegisterOnFirstLogin {
    async fn authenticate(&self, username: &str, password: &str) -> Result<bool, ApiError> {
        if let Some(existing) = self.store.find(username).await? {
            return verify_password(password, &existing.password_hash);
        }

        let credential = StoredCredential {
            username: username.to_string(),
            password_hash: hash_password(password)?,
        };

        if self.store.insert(credential).await? {
            tracing::info!("registered new user: {}", username);
            return Ok(true);
        }

        // lost a race with a concurrent first login
        match self.store.find(username).await? {
            Some(existing) => verify_password(password, &existing.password_hash),
            None => Ok(false),
        }
    }
}

fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(anyhow!("password hashing failed: {}", e)))
}

fn verify_password(password: &str, stored_hash: &str) -> Result<bool, ApiError> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| ApiError::Internal(anyhow!("stored password hash is unreadable: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
