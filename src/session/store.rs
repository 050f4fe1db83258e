//! Observable session store.
//!
//! One writer role (`login`/`logout`), many readers. Every transition is
//! published through a `watch` channel so consumers re-render on change
//! instead of polling.

use super::storage::{FileStorage, MemoryStorage, SessionStorage};
use super::token;
use crate::config::Config;
use crate::error::ValidationError;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

// ── Identity types ──────────────────────────────────────────────

/// Authorization role reported by the backend at login.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    /// Unknown role strings fall back to the backend default.
    #[default]
    #[serde(other)]
    User,
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }

    pub fn from_str_lossy(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("admin") {
            Self::Admin
        } else {
            Self::User
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who is logged in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub username: String,
    pub role: Role,
}

impl UserIdentity {
    pub fn new(username: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            role,
        }
    }
}

/// Current identity and credential. `token` is set iff `user` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: Option<UserIdentity>,
    pub token: Option<String>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.user
            .as_ref()
            .is_some_and(|user| user.role == Role::Admin)
    }

    /// Both halves present and non-empty, or both absent.
    fn is_consistent(&self) -> bool {
        match (&self.user, &self.token) {
            (None, None) => true,
            (Some(user), Some(token)) => {
                !user.username.trim().is_empty() && !token.trim().is_empty()
            }
            _ => false,
        }
    }
}

// ── Store ───────────────────────────────────────────────────────

/// Shared session container. Wrap in `Arc` and hand to every consumer.
pub struct SessionStore {
    state: watch::Sender<Session>,
    storage: Box<dyn SessionStorage>,
    /// Serializes persist + publish so storage and memory never disagree.
    write_lock: Mutex<()>,
}

impl SessionStore {
    /// Empty session over the given storage, ignoring anything persisted.
    pub fn new(storage: impl SessionStorage + 'static) -> Self {
        Self::with_session(storage, Session::default())
    }

    /// Empty session backed by process memory only.
    pub fn in_memory() -> Self {
        Self::new(MemoryStorage::new())
    }

    /// Restore the session persisted in `storage`, falling back to the
    /// empty session. Never fails.
    pub fn rehydrate(storage: impl SessionStorage + 'static) -> Self {
        Self::rehydrate_at(storage, Utc::now())
    }

    /// Session for a CLI run: memory only when `ephemeral`, otherwise
    /// rehydrated from the file under the configured data dir.
    pub fn open(config: &Config, ephemeral: bool) -> Self {
        if ephemeral {
            return Self::in_memory();
        }
        Self::rehydrate(FileStorage::in_dir(&config.resolved_data_dir()))
    }

    /// `rehydrate` with an explicit clock for expiry checks.
    pub fn rehydrate_at(storage: impl SessionStorage + 'static, now: DateTime<Utc>) -> Self {
        let raw = match storage.load() {
            Ok(raw) => raw,
            Err(e) => {
                tracing::debug!("Session storage unreadable, starting empty: {e:#}");
                None
            }
        };

        let session = match raw.as_deref().map(|raw| restore(raw, now)) {
            None => Session::default(),
            Some(Some(session)) => {
                if let Some(user) = &session.user {
                    tracing::debug!(username = %user.username, role = %user.role, "Session rehydrated");
                }
                session
            }
            Some(None) => {
                if let Err(e) = storage.clear() {
                    tracing::warn!("Failed to clear stale session: {e:#}");
                }
                Session::default()
            }
        };

        Self::with_session(storage, session)
    }

    fn with_session(storage: impl SessionStorage + 'static, session: Session) -> Self {
        let (state, _) = watch::channel(session);
        Self {
            state,
            storage: Box::new(storage),
            write_lock: Mutex::new(()),
        }
    }

    // ── Mutators ────────────────────────────────────────────────

    /// Set identity and token together, persist, and notify subscribers.
    /// Empty inputs are rejected and leave the session untouched.
    pub fn login(&self, user: UserIdentity, token: impl Into<String>) -> Result<(), ValidationError> {
        let token = token.into();
        if user.username.trim().is_empty() {
            return Err(ValidationError::Required("Username"));
        }
        if token.trim().is_empty() {
            return Err(ValidationError::Required("Access token"));
        }

        let session = Session {
            user: Some(user),
            token: Some(token),
        };

        let _guard = self.write_lock.lock();
        match serde_json::to_string(&session) {
            Ok(json) => {
                if let Err(e) = self.storage.save(&json) {
                    tracing::warn!("Failed to persist session: {e:#}");
                }
            }
            Err(e) => tracing::warn!("Failed to serialize session: {e}"),
        }

        if let Some(user) = &session.user {
            tracing::info!(username = %user.username, role = %user.role, "Logged in");
        }
        self.state.send_replace(session);
        Ok(())
    }

    /// Clear identity and token together, drop the persisted copy, and
    /// notify subscribers.
    pub fn logout(&self) {
        let _guard = self.write_lock.lock();
        if let Err(e) = self.storage.clear() {
            tracing::warn!("Failed to clear persisted session: {e:#}");
        }

        let previous = self.state.send_replace(Session::default());
        if let Some(user) = previous.user {
            tracing::info!(username = %user.username, "Logged out");
        }
    }

    // ── Readers ─────────────────────────────────────────────────

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn is_admin(&self) -> bool {
        self.state.borrow().is_admin()
    }

    pub fn token(&self) -> Option<String> {
        self.state.borrow().token.clone()
    }

    pub fn user(&self) -> Option<UserIdentity> {
        self.state.borrow().user.clone()
    }

    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Receiver that sees every subsequent session value.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let session = self.state.borrow();
        f.debug_struct("SessionStore")
            .field("user", &session.user)
            .field("authenticated", &session.is_authenticated())
            .finish()
    }
}

/// Parse a persisted session; `None` if it is malformed, partial or expired.
fn restore(raw: &str, now: DateTime<Utc>) -> Option<Session> {
    let session: Session = match serde_json::from_str(raw) {
        Ok(session) => session,
        Err(e) => {
            tracing::debug!("Discarding malformed persisted session: {e}");
            return None;
        }
    };

    if !session.is_consistent() {
        tracing::debug!("Discarding persisted session with mismatched user/token");
        return None;
    }

    if let Some(token) = &session.token {
        if token::is_expired(token, now) {
            tracing::info!("Persisted session token expired, starting logged out");
            return None;
        }
    }

    Some(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::storage::FileStorage;
    use crate::session::token::fake_jwt;
    use tempfile::TempDir;

    fn admin() -> UserIdentity {
        UserIdentity::new("admin", Role::Admin)
    }

    fn reader() -> UserIdentity {
        UserIdentity::new("alice", Role::User)
    }

    #[test]
    fn starts_empty() {
        let store = SessionStore::in_memory();
        assert!(!store.is_authenticated());
        assert!(!store.is_admin());
        assert_eq!(store.snapshot(), Session::default());
    }

    #[test]
    fn login_sets_identity_and_token() {
        for (user, expect_admin) in [(admin(), true), (reader(), false)] {
            let store = SessionStore::in_memory();
            store.login(user.clone(), "tok").unwrap();

            assert!(store.is_authenticated());
            assert_eq!(store.is_admin(), expect_admin);
            assert_eq!(store.token().as_deref(), Some("tok"));
            assert_eq!(store.user(), Some(user));
        }
    }

    #[test]
    fn logout_resets_regardless_of_prior_state() {
        let store = SessionStore::in_memory();
        store.logout();
        assert!(!store.is_authenticated());

        store.login(admin(), "tok").unwrap();
        store.logout();
        assert!(!store.is_authenticated());
        assert!(!store.is_admin());
        assert!(store.user().is_none());
        assert!(store.token().is_none());
    }

    #[test]
    fn login_rejects_empty_inputs_without_mutation() {
        let store = SessionStore::in_memory();
        store.login(reader(), "first").unwrap();

        assert_eq!(
            store.login(admin(), "  "),
            Err(ValidationError::Required("Access token"))
        );
        assert_eq!(
            store.login(UserIdentity::new("", Role::Admin), "tok"),
            Err(ValidationError::Required("Username"))
        );

        assert_eq!(store.user(), Some(reader()));
        assert_eq!(store.token().as_deref(), Some("first"));
    }

    #[test]
    fn login_persists_and_logout_clears() {
        let storage = MemoryStorage::new();
        let store = SessionStore::new(storage.clone());

        store.login(admin(), "tok").unwrap();
        let saved = storage.load().unwrap().unwrap();
        let parsed: Session = serde_json::from_str(&saved).unwrap();
        assert_eq!(parsed.token.as_deref(), Some("tok"));
        assert_eq!(parsed.user, Some(admin()));

        store.logout();
        assert!(storage.load().unwrap().is_none());
    }

    #[test]
    fn persisted_session_survives_restart() {
        let tmp = TempDir::new().unwrap();
        {
            let store = SessionStore::rehydrate(FileStorage::in_dir(tmp.path()));
            store.login(reader(), "opaque-token").unwrap();
        }

        let store = SessionStore::rehydrate(FileStorage::in_dir(tmp.path()));
        assert!(store.is_authenticated());
        assert_eq!(store.user(), Some(reader()));
        assert_eq!(store.token().as_deref(), Some("opaque-token"));
    }

    #[test]
    fn rehydrate_corrupted_data_is_empty_session() {
        for raw in [
            "not json",
            "{",
            "[]",
            "42",
            r#"{"user":{"username":"bob"},"token":"t"}"#,
            r#"{"user":null,"token":"t"}"#,
            r#"{"user":{"username":"bob","role":"user"},"token":null}"#,
            r#"{"user":{"username":"","role":"user"},"token":"t"}"#,
        ] {
            let storage = MemoryStorage::with_value(raw);
            let store = SessionStore::rehydrate(storage.clone());
            assert_eq!(store.snapshot(), Session::default(), "input: {raw}");
            assert!(storage.load().unwrap().is_none(), "stale copy kept for: {raw}");
        }
    }

    #[test]
    fn rehydrate_unknown_role_falls_back_to_user() {
        let raw = r#"{"user":{"username":"bob","role":"librarian"},"token":"t"}"#;
        let store = SessionStore::rehydrate(MemoryStorage::with_value(raw));
        assert!(store.is_authenticated());
        assert!(!store.is_admin());
    }

    #[test]
    fn rehydrate_drops_expired_token() {
        let now = DateTime::from_timestamp(2_000, 0).unwrap();
        let expired = serde_json::to_string(&Session {
            user: Some(reader()),
            token: Some(fake_jwt(1_000)),
        })
        .unwrap();
        let fresh = serde_json::to_string(&Session {
            user: Some(reader()),
            token: Some(fake_jwt(3_000)),
        })
        .unwrap();

        assert!(!SessionStore::rehydrate_at(MemoryStorage::with_value(expired), now).is_authenticated());
        assert!(SessionStore::rehydrate_at(MemoryStorage::with_value(fresh), now).is_authenticated());
    }

    #[tokio::test]
    async fn subscribers_observe_transitions() {
        let store = SessionStore::in_memory();
        let mut rx = store.subscribe();
        assert!(!rx.borrow_and_update().is_authenticated());

        store.login(admin(), "tok").unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_admin());

        store.logout();
        rx.changed().await.unwrap();
        assert!(!rx.borrow_and_update().is_authenticated());
    }

    #[test]
    fn role_parsing_is_lossy() {
        assert_eq!(Role::from_str_lossy("admin"), Role::Admin);
        assert_eq!(Role::from_str_lossy(" ADMIN "), Role::Admin);
        assert_eq!(Role::from_str_lossy("user"), Role::User);
        assert_eq!(Role::from_str_lossy("editor"), Role::User);
        assert_eq!(Role::Admin.to_string(), "admin");
    }
}
