//! In-process user store.
//!
//! Implements the user lookup surface behind the register and login
//! routes. Users are seeded from configuration at startup; runtime
//! registrations live for the process lifetime only, since durable
//! persistence stays an external concern.

use crate::config::SeedUser;
use crate::models::User;
use chrono::Utc;
use std::collections::{hash_map, HashMap};
use std::sync::RwLock;
use thiserror::Error;
use tracing::{info, warn};

/// Returned when registering a username that is already taken.
#[derive(Debug, Error)]
#[error("username already exists")]
pub struct UserExists;

/// Thread-safe user store keyed by username.
#[derive(Default)]
pub struct UserStore {
    users: RwLock<HashMap<String, User>>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store from config entries. Duplicate usernames in the
    /// config are skipped with a warning.
    pub fn seed(&self, seeds: &[SeedUser]) {
        for seed in seeds {
            let user = User {
                username: seed.username.clone(),
                password_hash: seed.password_hash.clone(),
                created_at: Utc::now(),
            };

            if self.insert(user).is_err() {
                warn!("Duplicate seed user skipped: {}", seed.username);
            }
        }

        if !seeds.is_empty() {
            info!("Seeded {} users from config", seeds.len());
        }
    }

    /// Look up a user by username.
    pub fn get(&self, username: &str) -> Option<User> {
        self.users
            .read()
            .expect("user store lock poisoned")
            .get(username)
            .cloned()
    }

    /// Insert a new user, failing if the username is taken.
    pub fn insert(&self, user: User) -> Result<(), UserExists> {
        let mut users = self.users.write().expect("user store lock poisoned");

        match users.entry(user.username.clone()) {
            hash_map::Entry::Occupied(_) => Err(UserExists),
            hash_map::Entry::Vacant(entry) => {
                entry.insert(user);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(username: &str) -> User {
        User {
            username: username.to_string(),
            password_hash: "salt:key".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_insert_and_get() {
        let store = UserStore::new();
        store.insert(user("alice")).unwrap();

        let found = store.get("alice").unwrap();
        assert_eq!(found.username, "alice");
        assert!(store.get("bob").is_none());
    }

    #[test]
    fn test_insert_duplicate_fails() {
        let store = UserStore::new();
        store.insert(user("alice")).unwrap();
        assert!(store.insert(user("alice")).is_err());
    }

    #[test]
    fn test_seed_from_config() {
        let store = UserStore::new();
        store.seed(&[
            SeedUser {
                username: "foreman".to_string(),
                password_hash: "salt:key".to_string(),
            },
            SeedUser {
                username: "foreman".to_string(),
                password_hash: "other:key".to_string(),
            },
        ]);

        // The duplicate entry is skipped, the first wins.
        let found = store.get("foreman").unwrap();
        assert_eq!(found.password_hash, "salt:key");
    }
}
