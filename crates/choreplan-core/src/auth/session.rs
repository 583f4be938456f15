//! Persisted session credential (token + user id).
//!
//! The pair is written by login and cleared as a unit by logout or by
//! any 401 seen elsewhere. It is never ambient state: the store is
//! owned by [`AuthService`](crate::auth::AuthService) and passed by
//! value (cheap clone) into whatever needs to authorize requests.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::error::SessionError;

const SERVICE: &str = "choreplan";
const TOKEN_KEY: &str = "auth_token";
const USER_ID_KEY: &str = "user_id";

/// The authenticated identity: bearer token plus backend user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user_id: String,
}

/// Durable storage for the session pair.
///
/// The default backend is the OS keyring; `in_memory()` provides a
/// process-local store for tests. Clones share the same underlying
/// storage.
#[derive(Clone)]
pub struct SessionStore {
    backend: Backend,
}

#[derive(Clone)]
enum Backend {
    Keyring,
    Memory(Arc<Mutex<Option<Session>>>),
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// Keyring-backed store (the production default).
    pub fn new() -> Self {
        Self {
            backend: Backend::Keyring,
        }
    }

    /// Process-local store, for tests and offline use.
    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory(Arc::new(Mutex::new(None))),
        }
    }

    /// Persist a session, replacing any previous one.
    pub fn save(&self, session: &Session) -> Result<(), SessionError> {
        match &self.backend {
            Backend::Keyring => {
                keyring_set(TOKEN_KEY, &session.token)?;
                keyring_set(USER_ID_KEY, &session.user_id)?;
                Ok(())
            }
            Backend::Memory(slot) => {
                *lock(slot) = Some(session.clone());
                Ok(())
            }
        }
    }

    /// Load the stored session. A half-written pair (one key missing)
    /// counts as no session.
    pub fn load(&self) -> Result<Option<Session>, SessionError> {
        match &self.backend {
            Backend::Keyring => {
                let token = keyring_get(TOKEN_KEY)?;
                let user_id = keyring_get(USER_ID_KEY)?;
                Ok(match (token, user_id) {
                    (Some(token), Some(user_id)) => Some(Session { token, user_id }),
                    _ => None,
                })
            }
            Backend::Memory(slot) => Ok(lock(slot).clone()),
        }
    }

    /// Remove both keys. Clearing an empty store is not an error.
    pub fn clear(&self) -> Result<(), SessionError> {
        match &self.backend {
            Backend::Keyring => {
                keyring_delete(TOKEN_KEY)?;
                keyring_delete(USER_ID_KEY)?;
                Ok(())
            }
            Backend::Memory(slot) => {
                *lock(slot) = None;
                Ok(())
            }
        }
    }
}

fn lock(slot: &Mutex<Option<Session>>) -> std::sync::MutexGuard<'_, Option<Session>> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn keyring_get(key: &str) -> Result<Option<String>, SessionError> {
    let entry = keyring::Entry::new(SERVICE, key)?;
    match entry.get_password() {
        Ok(value) => Ok(Some(value)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn keyring_set(key: &str, value: &str) -> Result<(), SessionError> {
    let entry = keyring::Entry::new(SERVICE, key)?;
    entry.set_password(value)?;
    Ok(())
}

fn keyring_delete(key: &str) -> Result<(), SessionError> {
    let entry = keyring::Entry::new(SERVICE, key)?;
    match entry.delete_credential() {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_roundtrip() {
        let store = SessionStore::in_memory();
        assert_eq!(store.load().unwrap(), None);

        let session = Session {
            token: "tok".into(),
            user_id: "u1".into(),
        };
        store.save(&session).unwrap();
        assert_eq!(store.load().unwrap(), Some(session));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn clones_share_storage() {
        let store = SessionStore::in_memory();
        let other = store.clone();
        store
            .save(&Session {
                token: "tok".into(),
                user_id: "u1".into(),
            })
            .unwrap();
        assert!(other.load().unwrap().is_some());

        other.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn clearing_an_empty_store_is_fine() {
        let store = SessionStore::in_memory();
        store.clear().unwrap();
        store.clear().unwrap();
    }
}
