//! Auth session persistence.
//!
//! A session is the bearer token plus the minimal user profile returned by the
//! login endpoint. It is stored under two keys so the token can be read without
//! parsing the profile. There is no expiry logic: a 401 from the server is the
//! only signal that a token went stale.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::store::KeyValueStore;

const TOKEN_KEY: &str = "auth_token";
const USER_KEY: &str = "user.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

impl UserProfile {
    /// Name to greet the user with: name, else email, else "User".
    pub fn display_name(&self) -> &str {
        [self.name.as_str(), self.email.as_str()]
            .into_iter()
            .find(|s| !s.trim().is_empty())
            .unwrap_or("User")
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: UserProfile,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("user", &self.user)
            .finish()
    }
}

/// Where the current session lives.
pub trait SessionRepository: Send + Sync {
    fn get(&self) -> Result<Option<Session>>;

    fn token(&self) -> Result<Option<String>> {
        Ok(self.get()?.map(|s| s.token))
    }

    fn set(&self, session: &Session) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// [`SessionRepository`] over any [`KeyValueStore`].
#[derive(Debug)]
pub struct SessionStore<S> {
    store: S,
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S: KeyValueStore> SessionRepository for SessionStore<S> {
    /// A stored token is a session even when the profile is missing or unreadable.
    fn get(&self) -> Result<Option<Session>> {
        let Some(token) = self.token()? else {
            return Ok(None);
        };
        let user = match self.store.get(USER_KEY)? {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!("ignoring unreadable stored user profile: {}", e);
                UserProfile::default()
            }),
            None => UserProfile::default(),
        };
        Ok(Some(Session { token, user }))
    }

    fn token(&self) -> Result<Option<String>> {
        Ok(self
            .store
            .get(TOKEN_KEY)?
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty()))
    }

    fn set(&self, session: &Session) -> Result<()> {
        let user = serde_json::to_string(&session.user).context("serialize user profile")?;
        let previous = self.store.get(TOKEN_KEY)?;
        self.store.set(TOKEN_KEY, &session.token)?;
        if let Err(e) = self.store.set(USER_KEY, &user) {
            // Put the old token back so a failed login leaves the session as it was.
            let rollback = match &previous {
                Some(token) => self.store.set(TOKEN_KEY, token),
                None => self.store.remove(TOKEN_KEY),
            };
            if let Err(cleanup) = rollback {
                tracing::warn!("could not roll back token after failed write: {:#}", cleanup);
            }
            return Err(e);
        }
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.store.remove(TOKEN_KEY)?;
        self.store.remove(USER_KEY)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::sync::Arc;

    fn session() -> Session {
        Session {
            token: "tok-123".to_string(),
            user: UserProfile {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
            },
        }
    }

    #[test]
    fn empty_store_has_no_session() {
        let sessions = SessionStore::new(MemoryStore::new());
        assert!(sessions.get().unwrap().is_none());
        assert!(sessions.token().unwrap().is_none());
    }

    #[test]
    fn set_get_clear() {
        let sessions = SessionStore::new(MemoryStore::new());
        sessions.set(&session()).unwrap();
        assert_eq!(sessions.get().unwrap(), Some(session()));
        assert_eq!(sessions.token().unwrap().as_deref(), Some("tok-123"));
        sessions.clear().unwrap();
        assert!(sessions.get().unwrap().is_none());
    }

    #[test]
    fn token_without_profile_is_still_a_session() {
        let store = Arc::new(MemoryStore::new());
        store.set(TOKEN_KEY, "tok").unwrap();
        store.set(USER_KEY, "{not json").unwrap();
        let sessions = SessionStore::new(Arc::clone(&store));
        let s = sessions.get().unwrap().unwrap();
        assert_eq!(s.token, "tok");
        assert_eq!(s.user, UserProfile::default());
    }

    /// Accepts every write except the user profile.
    struct ProfileWriteFails(MemoryStore);

    impl KeyValueStore for ProfileWriteFails {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.0.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            if key == USER_KEY {
                anyhow::bail!("disk full");
            }
            self.0.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<()> {
            self.0.remove(key)
        }
    }

    #[test]
    fn failed_profile_write_leaves_no_token() {
        let sessions = SessionStore::new(ProfileWriteFails(MemoryStore::new()));
        assert!(sessions.set(&session()).is_err());
        assert!(sessions.token().unwrap().is_none());
        assert!(sessions.get().unwrap().is_none());
    }

    #[test]
    fn failed_profile_write_restores_previous_token() {
        let inner = MemoryStore::new();
        inner.set(TOKEN_KEY, "old").unwrap();
        let sessions = SessionStore::new(ProfileWriteFails(inner));
        assert!(sessions.set(&session()).is_err());
        assert_eq!(sessions.token().unwrap().as_deref(), Some("old"));
    }

    #[test]
    fn display_name_falls_back() {
        let mut user = UserProfile::default();
        assert_eq!(user.display_name(), "User");
        user.email = "ada@example.com".to_string();
        assert_eq!(user.display_name(), "ada@example.com");
        user.name = "Ada".to_string();
        assert_eq!(user.display_name(), "Ada");
    }

    #[test]
    fn debug_redacts_token() {
        assert!(!format!("{:?}", session()).contains("tok-123"));
    }
}
