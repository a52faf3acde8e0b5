//! Application state: catalog, in-memory session store, and persisted settings.
//!
//! This module owns:
//!   - the read-only catalog (built-ins + optional TOML extension)
//!   - sessions by id (one `Session` value per drill in progress)
//!   - the cached settings record and the file store behind it
//!
//! Each request locks the session map, runs one synchronous engine transition,
//! and releases it; there is no other shared mutable state.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::RwLock;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::config::load_catalog_config_from_env;
use crate::engine::Session;
use crate::settings::{Settings, SettingsStore};

// HTTP sessions idle longer than this are dropped on the next insert.
const SESSION_IDLE_TTL: Duration = Duration::from_secs(2 * 60 * 60);
const MAX_SESSIONS: usize = 1024;

#[derive(Clone, Debug)]
pub struct SessionEntry {
    pub session: Session,
    pub last_access: Instant,
}

impl SessionEntry {
    fn new(session: Session) -> Self {
        Self { session, last_access: Instant::now() }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub sessions: Arc<RwLock<HashMap<String, SessionEntry>>>,
    pub settings: Arc<RwLock<Settings>>,
    pub store: SettingsStore,
    session_ttl: Duration,
    max_sessions: usize,
}

impl AppState {
    /// Build state from env: load catalog config, build catalog, load settings.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let cfg_opt = load_catalog_config_from_env();
        let catalog = Catalog::with_config(cfg_opt.as_ref());
        let store = SettingsStore::from_env();
        info!(target: "tonedoku_backend", data_dir = %store.dir().display(), "Settings store ready");
        Self::with_parts(catalog, store)
    }

    pub fn with_parts(catalog: Catalog, store: SettingsStore) -> Self {
        let settings = store.load_settings();
        Self {
            catalog: Arc::new(catalog),
            sessions: Arc::new(RwLock::new(HashMap::new())),
            settings: Arc::new(RwLock::new(settings)),
            store,
            session_ttl: SESSION_IDLE_TTL,
            max_sessions: MAX_SESSIONS,
        }
    }

    /// Override the idle TTL and the cap on stored sessions.
    pub fn with_session_limits(mut self, ttl: Duration, max_sessions: usize) -> Self {
        self.session_ttl = ttl;
        self.max_sessions = max_sessions.max(1);
        self
    }

    /// Store a session under a fresh id. Idle sessions are evicted first, then
    /// the least recently used ones while the map is at capacity.
    #[instrument(level = "debug", skip(self, session))]
    pub async fn insert_session(&self, session: Session) -> String {
        let id = Uuid::new_v4().to_string();
        let mut sessions = self.sessions.write().await;

        let before = sessions.len();
        let ttl = self.session_ttl;
        sessions.retain(|_, e| e.last_access.elapsed() < ttl);
        while sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, e)| e.last_access)
                .map(|(k, _)| k.clone());
            match oldest {
                Some(k) => sessions.remove(&k),
                None => break,
            };
        }
        let evicted = before - sessions.len();
        if evicted > 0 {
            info!(target: "session", evicted, remaining = sessions.len(), "Evicted stale sessions");
        }

        sessions.insert(id.clone(), SessionEntry::new(session));
        id
    }

    /// Copy of a session by id. Counts as an access.
    #[instrument(level = "debug", skip(self), fields(%id))]
    pub async fn get_session(&self, id: &str) -> Option<Session> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(id)?;
        entry.last_access = Instant::now();
        Some(entry.session.clone())
    }

    #[instrument(level = "debug", skip(self), fields(%id))]
    pub async fn remove_session(&self, id: &str) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    pub async fn notation(&self) -> crate::notation::NoteNotation {
        self.settings.read().await.note_notation
    }

    /// Replace the settings record (clamped) and persist it.
    #[instrument(level = "info", skip(self))]
    pub async fn update_settings(&self, next: Settings) -> Result<Settings, String> {
        self.modify_settings(|_| next).await
    }

    /// Read-modify-write of the settings record under one write guard, so
    /// concurrent toggles never start from the same stale copy.
    pub async fn modify_settings(&self, f: impl FnOnce(Settings) -> Settings) -> Result<Settings, String> {
        let mut current = self.settings.write().await;
        let next = f(current.clone()).clamped();
        self.store.save_settings(&next)?;
        *current = next.clone();
        Ok(next)
    }

    /// Drop persisted settings and progress, back to defaults.
    #[instrument(level = "info", skip(self))]
    pub async fn clear_storage(&self) -> Result<Settings, String> {
        let mut current = self.settings.write().await;
        self.store.clear()?;
        *current = Settings::default();
        Ok(current.clone())
    }

    /// Remember the last tier played per scale. Failures are logged only.
    pub async fn record_progress(&self, scale_id: &str, level: u32) {
        // Same lock as settings writes, so the data directory has one writer.
        let _guard = self.settings.write().await;
        if let Err(e) = self.store.record_level_played(scale_id, level) {
            error!(target: "settings", %scale_id, level, error = %e, "Failed to record progress");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_state() -> AppState {
        let dir = std::env::temp_dir().join(format!("tonedoku-state-{}", Uuid::new_v4()));
        AppState::with_parts(Catalog::builtin(), SettingsStore::new(dir))
    }

    #[tokio::test]
    async fn idle_sessions_are_evicted_on_insert() {
        let state = test_state().with_session_limits(Duration::ZERO, 16);
        let first = state.insert_session(Session::new()).await;
        let second = state.insert_session(Session::new()).await;
        assert!(state.get_session(&first).await.is_none());
        assert!(state.get_session(&second).await.is_some());
    }

    #[tokio::test]
    async fn least_recently_used_session_is_dropped_at_capacity() {
        let state = test_state().with_session_limits(SESSION_IDLE_TTL, 2);
        let a = state.insert_session(Session::new()).await;
        let b = state.insert_session(Session::new()).await;
        assert!(state.get_session(&a).await.is_some());

        let c = state.insert_session(Session::new()).await;
        assert_eq!(state.sessions.read().await.len(), 2);
        assert!(state.get_session(&a).await.is_some());
        assert!(state.get_session(&b).await.is_none());
        assert!(state.get_session(&c).await.is_some());
    }

    #[tokio::test]
    async fn modify_settings_clamps_and_persists() {
        let state = test_state();
        let saved = state.modify_settings(|s| s.with_volume(3.0)).await.expect("save");
        assert_eq!(saved.volume, 1.0);
        assert_eq!(state.store.load_settings().volume, 1.0);
        assert_eq!(state.settings.read().await.volume, 1.0);
    }
}
