//! Server-side session store for federated identities.
//!
//! Sessions are keyed by an opaque random identifier handed to the client in
//! an HTTP-only cookie. The identity record lives only here; the cookie is
//! never a source of truth.

use crate::models::FederatedProfile;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use ring::rand::{SecureRandom, SystemRandom};

/// Sessions expire after this many hours, matching the credential lifetime.
const SESSION_TTL_HOURS: i64 = 24;

struct SessionEntry {
    profile: FederatedProfile,
    created_at: DateTime<Utc>,
}

/// Concurrent session map. One entry per active federated login.
pub struct SessionStore {
    sessions: DashMap<String, SessionEntry>,
    rng: SystemRandom,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
            rng: SystemRandom::new(),
        }
    }

    /// Create a session for a federated profile, returning the opaque id.
    pub fn create(&self, profile: FederatedProfile) -> anyhow::Result<String> {
        let mut bytes = [0u8; 32];
        self.rng
            .fill(&mut bytes)
            .map_err(|_| anyhow::anyhow!("session id generation failed"))?;
        let id = hex::encode(bytes);

        self.sessions.insert(
            id.clone(),
            SessionEntry {
                profile,
                created_at: Utc::now(),
            },
        );
        Ok(id)
    }

    /// Fetch the identity for a session id, expiring stale entries on read.
    pub fn get(&self, id: &str) -> Option<FederatedProfile> {
        let expired = match self.sessions.get(id) {
            Some(entry) => {
                if Utc::now() - entry.created_at > Duration::hours(SESSION_TTL_HOURS) {
                    true
                } else {
                    return Some(entry.profile.clone());
                }
            }
            None => return None,
        };

        if expired {
            self.sessions.remove(id);
        }
        None
    }

    /// Invalidate a session. Idempotent: removing an unknown or
    /// already-removed id is not an error.
    pub fn remove(&self, id: &str) {
        self.sessions.remove(id);
    }
}
