//! Fixed account store with bcrypt password hashes.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::AppError;

/// Accounts seeded at startup.
const ACCOUNTS: &[(&str, &str, Role)] = &[
    ("admin", "admin123", Role::Admin),
    ("user", "user123", Role::User),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

#[derive(Debug, Clone)]
pub struct Account {
    pub username: String,
    pub role: Role,
    password_hash: String,
}

/// In-memory accounts. Plaintext passwords are hashed once at construction.
#[derive(Debug)]
pub struct UserStore {
    accounts: HashMap<String, Account>,
    /// Verified against for unknown users so both paths cost one bcrypt check.
    decoy_hash: String,
}

impl UserStore {
    pub fn new() -> Result<Self, AppError> {
        Self::with_cost(bcrypt::DEFAULT_COST)
    }

    /// Builds the store with an explicit bcrypt cost; tests use the minimum.
    pub fn with_cost(cost: u32) -> Result<Self, AppError> {
        let hash = |password: &str| {
            bcrypt::hash(password, cost)
                .map_err(|e| AppError::Internal(format!("failed to hash password: {}", e)))
        };

        let mut accounts = HashMap::new();
        for (username, password, role) in ACCOUNTS {
            accounts.insert(
                username.to_string(),
                Account {
                    username: username.to_string(),
                    role: *role,
                    password_hash: hash(password)?,
                },
            );
        }

        tracing::info!(accounts = accounts.len(), "User store initialized");
        Ok(Self {
            accounts,
            decoy_hash: hash("decoy")?,
        })
    }

    pub fn get(&self, username: &str) -> Option<&Account> {
        self.accounts.get(username)
    }

    /// Checks a username/password pair. Unknown users and wrong passwords are
    /// reported identically.
    pub fn verify(&self, username: &str, password: &str) -> Result<&Account, AppError> {
        let account = self.accounts.get(username);
        let hash = account
            .map(|a| a.password_hash.as_str())
            .unwrap_or(self.decoy_hash.as_str());

        let matches = bcrypt::verify(password, hash).unwrap_or_else(|e| {
            tracing::error!(error = %e, "Password verification error");
            false
        });

        match account {
            Some(account) if matches => Ok(account),
            _ => {
                tracing::warn!(username = %username, "Invalid credentials");
                Err(AppError::Auth("invalid username or password".into()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> UserStore {
        UserStore::with_cost(4).unwrap()
    }

    #[test]
    fn test_valid_credentials() {
        let store = store();
        assert_eq!(store.verify("admin", "admin123").unwrap().role, Role::Admin);
        assert_eq!(store.verify("user", "user123").unwrap().role, Role::User);
    }

    #[test]
    fn test_wrong_password() {
        assert!(matches!(
            store().verify("admin", "user123"),
            Err(AppError::Auth(_))
        ));
    }

    #[test]
    fn test_unknown_user() {
        let err = store().verify("mallory", "admin123").unwrap_err();
        assert_eq!(err.to_string(), "Authentication failed: invalid username or password");
    }

    #[test]
    fn test_hashes_are_not_plaintext() {
        let store = store();
        let account = store.get("admin").unwrap();
        assert_ne!(account.password_hash, "admin123");
        assert!(account.password_hash.starts_with("$2"));
    }
}
