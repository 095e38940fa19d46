//! In-process session store.
//!
//! Sessions map an opaque client-held token to a snapshot of the user taken
//! at login. The snapshot is authoritative until the session ends; later
//! changes to the user row are not reflected until the next login. Entries
//! expire after a configurable idle timeout, refreshed on every lookup.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use rand::Rng;
use sha2::{Digest, Sha256};

use crate::db::Role;

/// Authenticated identity snapshot held server-side for the lifetime of a
/// session. Presence of a session is the sole proof of authentication.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Session {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

struct SessionEntry {
    session: Session,
    expires_at: DateTime<Utc>,
}

/// Concurrent token -> session map. Tokens are keyed by their SHA-256,
/// never stored in the clear.
pub struct SessionStore {
    entries: DashMap<String, SessionEntry>,
    idle_timeout: Duration,
}

impl SessionStore {
    pub fn new(idle_minutes: i64) -> Self {
        Self {
            entries: DashMap::new(),
            idle_timeout: Duration::minutes(idle_minutes),
        }
    }

    /// Store a session snapshot and return the opaque token to hand to the
    /// client. The entry is queryable as soon as this returns.
    pub fn create(&self, session: Session) -> String {
        let token = generate_token();
        self.entries.insert(
            hash_token(&token),
            SessionEntry {
                session,
                expires_at: Utc::now() + self.idle_timeout,
            },
        );
        token
    }

    /// Look up the session for a token, refreshing its idle deadline.
    /// Expired entries are evicted on access.
    pub fn get(&self, token: &str) -> Option<Session> {
        let key = hash_token(token);
        let now = Utc::now();

        if let Some(mut entry) = self.entries.get_mut(&key) {
            if entry.expires_at <= now {
                drop(entry);
                self.entries.remove(&key);
                return None;
            }
            entry.expires_at = now + self.idle_timeout;
            return Some(entry.session.clone());
        }
        None
    }

    /// Destroy the session for a token. Destroying an absent session is
    /// not an error.
    pub fn destroy(&self, token: &str) {
        self.entries.remove(&hash_token(token));
    }

    /// Drop all expired entries; returns how many were removed.
    pub fn prune_expired(&self) -> usize {
        let now = Utc::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Generate a random token
fn generate_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();
    hex::encode(bytes)
}

/// Hash a token for storage
fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(id: &str, role: Role) -> Session {
        Session {
            id: id.to_string(),
            name: "Kofi".to_string(),
            email: format!("{}@example.com", id),
            role,
        }
    }

    #[test]
    fn test_create_then_get() {
        let store = SessionStore::new(30);
        let token = store.create(session("u1", Role::Shopkeeper));

        let found = store.get(&token).expect("session should be queryable");
        assert_eq!(found.id, "u1");
        assert_eq!(found.role, Role::Shopkeeper);
    }

    #[test]
    fn test_unknown_token_is_anonymous() {
        let store = SessionStore::new(30);
        store.create(session("u1", Role::Assistant));
        assert!(store.get("deadbeef").is_none());
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let store = SessionStore::new(30);
        let token = store.create(session("u1", Role::Assistant));

        store.destroy(&token);
        assert!(store.get(&token).is_none());
        // second destroy of the same (now absent) session is fine
        store.destroy(&token);
    }

    #[test]
    fn test_idle_expiry_evicts_on_access() {
        let store = SessionStore::new(0);
        let token = store.create(session("u1", Role::Assistant));

        assert!(store.get(&token).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_prune_expired() {
        let expired = SessionStore::new(0);
        expired.create(session("u1", Role::Assistant));
        expired.create(session("u2", Role::Assistant));
        assert_eq!(expired.prune_expired(), 2);
        assert!(expired.is_empty());

        let live = SessionStore::new(30);
        live.create(session("u3", Role::Shopkeeper));
        assert_eq!(live.prune_expired(), 0);
        assert_eq!(live.len(), 1);
    }

    #[test]
    fn test_sessions_are_independent() {
        let store = SessionStore::new(30);
        let t1 = store.create(session("u1", Role::Shopkeeper));
        let t2 = store.create(session("u2", Role::Assistant));

        store.destroy(&t1);
        assert!(store.get(&t1).is_none());

        let remaining = store.get(&t2).expect("unrelated session survives");
        assert_eq!(remaining.id, "u2");
    }

    #[test]
    fn test_tokens_are_unique_and_opaque() {
        let store = SessionStore::new(30);
        let t1 = store.create(session("u1", Role::Assistant));
        let t2 = store.create(session("u1", Role::Assistant));
        assert_ne!(t1, t2);
        assert_eq!(t1.len(), 64);
        assert!(t1.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
