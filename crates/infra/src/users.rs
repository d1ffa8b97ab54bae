//! Back-office user accounts and credential checks.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use agencyhub_auth::{PasswordError, Role, Session, SessionBindingError, hash_password, verify_password};
use agencyhub_core::{AgencyId, UserId};

use crate::repository::RepositoryError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: UserId,
    pub email: String,
    /// Argon2 PHC string.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub agency_id: Option<AgencyId>,
    pub active: bool,
}

impl UserAccount {
    /// Create an active account, hashing `password`.
    pub fn new(
        email: impl Into<String>,
        password: &str,
        role: Role,
        agency_id: Option<AgencyId>,
    ) -> Result<Self, PasswordError> {
        Ok(Self {
            id: UserId::new(),
            email: email.into(),
            password_hash: hash_password(password)?,
            role,
            agency_id,
            active: true,
        })
    }

    pub fn session(&self) -> Result<Session, SessionBindingError> {
        Session::new(self.id, self.email.clone(), self.role, self.agency_id)
    }
}

/// Lookup of accounts by login email (case-insensitive).
pub trait UserDirectory: Send + Sync {
    fn find_by_email(&self, email: &str) -> Option<UserAccount>;
    fn insert(&self, account: UserAccount) -> Result<(), RepositoryError>;
}

impl<S> UserDirectory for Arc<S>
where
    S: UserDirectory + ?Sized,
{
    fn find_by_email(&self, email: &str) -> Option<UserAccount> {
        (**self).find_by_email(email)
    }

    fn insert(&self, account: UserAccount) -> Result<(), RepositoryError> {
        (**self).insert(account)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    inner: RwLock<HashMap<String, UserAccount>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl UserDirectory for InMemoryUserDirectory {
    fn find_by_email(&self, email: &str) -> Option<UserAccount> {
        let map = self.inner.read().ok()?;
        map.get(&normalize_email(email)).cloned()
    }

    fn insert(&self, account: UserAccount) -> Result<(), RepositoryError> {
        account
            .session()
            .map_err(|e| RepositoryError::Conflict(e.to_string()))?;

        let mut map = self.inner.write().map_err(|_| RepositoryError::Poisoned)?;
        let key = normalize_email(&account.email);
        if map.contains_key(&key) {
            return Err(RepositoryError::Conflict(format!("user {key} already exists")));
        }
        map.insert(key, account);
        Ok(())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoginError {
    /// Unknown email, inactive account or wrong password. Deliberately a
    /// single variant so responses do not reveal which.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error(transparent)]
    Binding(#[from] SessionBindingError),
}

/// Check `email`/`password` and build the session to sign.
pub fn authenticate<D: UserDirectory + ?Sized>(
    directory: &D,
    email: &str,
    password: &str,
) -> Result<Session, LoginError> {
    let account = directory
        .find_by_email(email)
        .filter(|a| a.active)
        .ok_or(LoginError::InvalidCredentials)?;

    verify_password(password, &account.password_hash).map_err(|e| {
        tracing::debug!(user_id = %account.id, error = %e, "password check failed");
        LoginError::InvalidCredentials
    })?;

    Ok(account.session()?)
}
