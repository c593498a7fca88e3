//! Auth Session
//!
//! The session is an explicit object: restored from durable storage at
//! startup, changed only through the transitions below, torn down on logout.
//! Every transition rewrites the persisted record immediately.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::{AuthTokens, User, UserPatch};
use crate::notify::Subscribers;

/// Version written into the persisted envelope
const PERSIST_VERSION: u32 = 0;

/// Durable key/value slot holding the serialized session
pub trait SessionStorage {
    fn load(&self) -> Option<String>;
    fn save(&self, value: &str) -> AppResult<()>;
    fn remove(&self);
}

/// `window.localStorage` under a fixed key
pub struct BrowserStorage {
    key: String,
}

impl BrowserStorage {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    fn storage() -> Option<web_sys::Storage> {
        web_sys::window().and_then(|w| w.local_storage().ok().flatten())
    }
}

impl SessionStorage for BrowserStorage {
    fn load(&self) -> Option<String> {
        Self::storage().and_then(|s| s.get_item(&self.key).ok().flatten())
    }

    fn save(&self, value: &str) -> AppResult<()> {
        let storage = Self::storage()
            .ok_or_else(|| AppError::Storage("localStorage unavailable".to_string()))?;
        storage
            .set_item(&self.key, value)
            .map_err(|e| AppError::Storage(format!("{:?}", e)))
    }

    fn remove(&self) {
        if let Some(storage) = Self::storage() {
            let _ = storage.remove_item(&self.key);
        }
    }
}

/// In-memory slot (tests, and fallback when localStorage is blocked)
#[derive(Default)]
pub struct MemoryStorage {
    value: RefCell<Option<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: &str) -> Self {
        Self { value: RefCell::new(Some(value.to_string())) }
    }
}

impl SessionStorage for MemoryStorage {
    fn load(&self) -> Option<String> {
        self.value.borrow().clone()
    }

    fn save(&self, value: &str) -> AppResult<()> {
        *self.value.borrow_mut() = Some(value.to_string());
        Ok(())
    }

    fn remove(&self) {
        *self.value.borrow_mut() = None;
    }
}

/// The persisted part of the session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSession {
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub tokens: Option<AuthTokens>,
    #[serde(default)]
    pub is_authenticated: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    state: PersistedSession,
    #[serde(default)]
    version: u32,
}

impl PersistedSession {
    pub fn decode(raw: &str) -> AppResult<Self> {
        let envelope: Envelope = serde_json::from_str(raw)?;
        Ok(envelope.state)
    }

    pub fn encode(&self) -> AppResult<String> {
        let envelope = Envelope { state: self.clone(), version: PERSIST_VERSION };
        Ok(serde_json::to_string(&envelope)?)
    }
}

/// Full in-memory session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub user: Option<User>,
    pub tokens: Option<AuthTokens>,
    pub is_authenticated: bool,
    /// Transient, never persisted
    pub is_loading: bool,
}

impl Session {
    fn persisted(&self) -> PersistedSession {
        PersistedSession {
            user: self.user.clone(),
            tokens: self.tokens.clone(),
            is_authenticated: self.is_authenticated,
        }
    }
}

/// Session context shared by the HTTP layer, hooks and route guards
#[derive(Clone)]
pub struct SessionStore {
    state: Rc<RefCell<Session>>,
    storage: Rc<dyn SessionStorage>,
    subscribers: Subscribers,
}

impl SessionStore {
    /// Initialize from the persisted record; a corrupt record starts a fresh session
    pub fn restore(storage: Rc<dyn SessionStorage>) -> Self {
        let persisted = match storage.load() {
            Some(raw) => PersistedSession::decode(&raw).unwrap_or_else(|e| {
                log::warn!("Discarding unreadable persisted session: {}", e);
                storage.remove();
                PersistedSession::default()
            }),
            None => PersistedSession::default(),
        };
        let session = Session {
            // Authenticated only if the record is internally consistent
            is_authenticated: persisted.is_authenticated && persisted.tokens.is_some(),
            user: persisted.user,
            tokens: persisted.tokens,
            is_loading: false,
        };
        Self {
            state: Rc::new(RefCell::new(session)),
            storage,
            subscribers: Subscribers::default(),
        }
    }

    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated
    }

    pub fn user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    /// Access token as currently persisted (read before every request)
    pub fn persisted_access_token(&self) -> Option<String> {
        self.read_persisted().tokens.map(|t| t.access)
    }

    /// Refresh token as currently persisted
    pub fn persisted_refresh_token(&self) -> Option<String> {
        self.read_persisted().tokens.map(|t| t.refresh)
    }

    fn read_persisted(&self) -> PersistedSession {
        self.storage
            .load()
            .and_then(|raw| PersistedSession::decode(&raw).ok())
            .unwrap_or_default()
    }

    pub fn subscribe(&self, listener: impl Fn() + 'static) {
        self.subscribers.subscribe(listener);
    }

    // ========================
    // Transitions
    // ========================

    /// Login / registration succeeded
    pub fn set_auth(&self, user: User, tokens: AuthTokens) {
        log::info!("Session started for {}", user.email);
        self.transition(|s| {
            s.user = Some(user);
            s.tokens = Some(tokens);
            s.is_authenticated = true;
            s.is_loading = false;
        });
    }

    /// Logout or irrecoverable refresh failure
    pub fn clear(&self) {
        log::info!("Session cleared");
        self.storage.remove();
        self.transition(|s| *s = Session::default());
    }

    pub fn set_loading(&self, loading: bool) {
        // Transient: no need to touch storage
        self.state.borrow_mut().is_loading = loading;
        self.subscribers.notify();
    }

    /// Merge a partial profile into the current user; no-op when logged out
    pub fn update_user(&self, patch: &UserPatch) {
        if self.state.borrow().user.is_none() {
            return;
        }
        self.transition(|s| {
            if let Some(user) = s.user.as_mut() {
                user.merge(patch);
            }
        });
    }

    /// Swap in a refreshed access token, keeping the refresh token
    pub fn set_access_token(&self, access: String) {
        self.transition(|s| {
            if let Some(tokens) = s.tokens.as_mut() {
                tokens.access = access;
            }
        });
    }

    fn transition(&self, apply: impl FnOnce(&mut Session)) {
        let persisted = {
            let mut state = self.state.borrow_mut();
            apply(&mut state);
            state.persisted()
        };
        if persisted.tokens.is_some() || persisted.user.is_some() {
            match persisted.encode() {
                Ok(raw) => {
                    if let Err(e) = self.storage.save(&raw) {
                        log::error!("Failed to persist session: {}", e);
                    }
                }
                Err(e) => log::error!("Failed to encode session: {}", e),
            }
        }
        self.subscribers.notify();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn make_user() -> User {
        User {
            id: 1,
            username: "admin".to_string(),
            email: "admin@example.com".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            date_joined: None,
        }
    }

    fn make_tokens() -> AuthTokens {
        AuthTokens { access: "a1".to_string(), refresh: "r1".to_string() }
    }

    #[test]
    fn test_set_auth_persists_envelope() {
        let storage = Rc::new(MemoryStorage::new());
        let session = SessionStore::restore(storage.clone());
        session.set_auth(make_user(), make_tokens());

        let raw = storage.load().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["state"]["isAuthenticated"], true);
        assert_eq!(value["state"]["tokens"]["access"], "a1");
        assert_eq!(value["version"], 0);
        assert!(value["state"].get("isLoading").is_none());
    }

    #[test]
    fn test_restore_from_storage() {
        let storage = Rc::new(MemoryStorage::new());
        SessionStore::restore(storage.clone()).set_auth(make_user(), make_tokens());

        let restored = SessionStore::restore(storage);
        assert!(restored.is_authenticated());
        assert_eq!(restored.user().unwrap().username, "admin");
        assert!(!restored.snapshot().is_loading);
    }

    #[test]
    fn test_corrupt_record_is_discarded() {
        let storage = Rc::new(MemoryStorage::with_value("{not json"));
        let session = SessionStore::restore(storage.clone());
        assert!(!session.is_authenticated());
        assert!(storage.load().is_none());
    }

    #[test]
    fn test_flag_without_tokens_is_not_authenticated() {
        let storage = Rc::new(MemoryStorage::with_value(
            r#"{"state": {"user": null, "tokens": null, "isAuthenticated": true}, "version": 0}"#,
        ));
        assert!(!SessionStore::restore(storage).is_authenticated());
    }

    #[test]
    fn test_clear_removes_record() {
        let storage = Rc::new(MemoryStorage::new());
        let session = SessionStore::restore(storage.clone());
        session.set_auth(make_user(), make_tokens());
        session.clear();
        assert!(!session.is_authenticated());
        assert!(storage.load().is_none());
        assert_eq!(session.persisted_access_token(), None);
    }

    #[test]
    fn test_update_user_merges() {
        let storage = Rc::new(MemoryStorage::new());
        let session = SessionStore::restore(storage.clone());
        session.set_auth(make_user(), make_tokens());
        session.update_user(&UserPatch { last_name: Some("Byron".to_string()), ..Default::default() });

        let user = session.user().unwrap();
        assert_eq!(user.first_name, "Ada");
        assert_eq!(user.last_name, "Byron");
        let persisted = PersistedSession::decode(&storage.load().unwrap()).unwrap();
        assert_eq!(persisted.user.unwrap().last_name, "Byron");
    }

    #[test]
    fn test_set_access_token_keeps_refresh() {
        let storage = Rc::new(MemoryStorage::new());
        let session = SessionStore::restore(storage);
        session.set_auth(make_user(), make_tokens());
        session.set_access_token("a2".to_string());
        assert_eq!(session.persisted_access_token().as_deref(), Some("a2"));
        assert_eq!(session.persisted_refresh_token().as_deref(), Some("r1"));
    }

    #[test]
    fn test_loading_is_transient() {
        let storage = Rc::new(MemoryStorage::new());
        let session = SessionStore::restore(storage.clone());
        let notified = Rc::new(Cell::new(0));
        let counter = notified.clone();
        session.subscribe(move || counter.set(counter.get() + 1));

        session.set_loading(true);
        assert!(session.snapshot().is_loading);
        assert!(storage.load().is_none());
        assert_eq!(notified.get(), 1);
    }
}
