//! In-memory account store with bcrypt-hashed passwords.
//!
//! The demo deployment owns a fixed account set (one admin, ten workers)
//! seeded at startup. Usernames are unique under trim + lower-case
//! normalization and passwords never exist here in clear form.

use crate::models::account::normalize_username;
use crate::models::{Account, Role};
use std::collections::HashMap;

/// Keyed account records. Read-mostly after seeding, so a plain map behind
/// the `AppState` Arc is sufficient.
#[derive(Debug, Default)]
pub struct AccountStore {
    accounts: HashMap<String, Account>,
}

impl AccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the demo account set: `admin` plus `worker1`..`worker10`, all
    /// with the demo password.
    pub fn seeded_demo() -> anyhow::Result<Self> {
        let mut store = Self::new();
        let demo_hash = bcrypt::hash("123", bcrypt::DEFAULT_COST)?;

        store.insert_hashed("admin", &demo_hash, Role::Admin)?;
        for i in 1..=10 {
            store.insert_hashed(&format!("worker{}", i), &demo_hash, Role::Worker)?;
        }

        tracing::info!(count = store.accounts.len(), "Demo accounts seeded");
        Ok(store)
    }

    /// Insert an account with an already-computed bcrypt hash.
    /// Fails if the normalized username is already taken.
    pub fn insert_hashed(
        &mut self,
        username: &str,
        password_hash: &str,
        role: Role,
    ) -> anyhow::Result<()> {
        let normalized = normalize_username(username);
        if normalized.is_empty() {
            anyhow::bail!("username must not be empty");
        }
        if self.accounts.contains_key(&normalized) {
            anyhow::bail!("duplicate username: {}", normalized);
        }

        self.accounts.insert(
            normalized.clone(),
            Account {
                subject_id: normalized.clone(),
                username: normalized,
                password_hash: password_hash.to_string(),
                role,
            },
        );
        Ok(())
    }

    /// Look up an account by raw (unnormalized) username.
    pub fn get(&self, username: &str) -> Option<&Account> {
        self.accounts.get(&normalize_username(username))
    }

    /// Verify a username/password pair. Returns the account on success,
    /// `None` for unknown user or wrong password alike.
    pub fn verify_login(&self, username: &str, password: &str) -> Option<&Account> {
        let account = self.get(username)?;
        match bcrypt::verify(password, &account.password_hash) {
            Ok(true) => Some(account),
            Ok(false) => None,
            Err(e) => {
                tracing::error!(error = %e, "bcrypt verification error");
                None
            }
        }
    }
}
