//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Starting single or mixed sessions (and recording progress)
//!   - Applying one user intent to a session
//!   - Building snapshots in the user's notation
//!   - Reading and saving settings

use std::fmt;

use rand::Rng;
use tracing::{debug, info, instrument, warn};

use crate::catalog::Catalog;
use crate::engine::{Session, SessionMode, SubmitOutcome};
use crate::protocol::{snapshot, Intent, IntentOut, SessionSnapshot, StartSessionIn};
use crate::settings::{Settings, UserProgress};
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq)]
pub enum LogicError {
  UnknownSession(String),
  Rejected(String),
}

impl fmt::Display for LogicError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      LogicError::UnknownSession(id) => write!(f, "Unknown sessionId: {}", id),
      LogicError::Rejected(msg) => f.write_str(msg),
    }
  }
}

/// (Re)initialize `session` from a start request. On error the session is unchanged.
pub fn start<R: Rng + ?Sized>(session: &mut Session, catalog: &Catalog, req: &StartSessionIn, rng: &mut R) -> Result<(), String> {
  if req.mixed {
    return session.init_mixed_session(catalog, req.level, rng);
  }
  match req.scale_id.as_deref() {
    Some(scale_id) => session.init_session(catalog, scale_id, req.level, rng),
    None => Err("scaleId is required unless mixed=true".into()),
  }
}

/// Apply one intent. Only `Submit` yields an outcome; level changes can fail.
pub fn apply_intent<R: Rng + ?Sized>(
  session: &mut Session,
  catalog: &Catalog,
  intent: &Intent,
  rng: &mut R,
) -> Result<Option<SubmitOutcome>, String> {
  match intent {
    Intent::SelectNote { note } => session.select_note(*note),
    Intent::SelectAccidental { accidental } => session.select_accidental(*accidental),
    Intent::Submit => return Ok(Some(session.submit_answer())),
    Intent::Next => session.next_question(),
    Intent::Previous => session.previous_question(),
    Intent::ResetSelection => session.reset_selection(),
    Intent::ClearLastCorrect => session.clear_last_correct_note(),
    Intent::RestartLevel => session.restart_level(catalog, rng)?,
    Intent::NextLevel => session.advance_level(catalog, rng)?,
  }
  Ok(None)
}

/// Scale id and tier to record as progress, for single-scale sessions.
pub fn progress_key(session: &Session) -> Option<(String, u32)> {
  match session.mode() {
    SessionMode::Single { scale, level } => Some((scale.id.clone(), level.level)),
    _ => None,
  }
}

#[instrument(level = "info", skip(state))]
pub async fn create_session(state: &AppState, req: StartSessionIn) -> Result<SessionSnapshot, LogicError> {
  let mut session = Session::new();
  start(&mut session, &state.catalog, &req, &mut rand::thread_rng()).map_err(LogicError::Rejected)?;

  if let Some((scale_id, level)) = progress_key(&session) {
    state.record_progress(&scale_id, level).await;
  }
  let notation = state.notation().await;
  let id = state.insert_session(session.clone()).await;
  info!(target: "session", %id, mixed = req.mixed, level = req.level, "Session created");
  Ok(snapshot(&id, &session, &state.catalog, notation))
}

#[instrument(level = "debug", skip(state), fields(%id))]
pub async fn session_snapshot(state: &AppState, id: &str) -> Result<SessionSnapshot, LogicError> {
  let session = state
    .get_session(id)
    .await
    .ok_or_else(|| LogicError::UnknownSession(id.to_string()))?;
  let notation = state.notation().await;
  Ok(snapshot(id, &session, &state.catalog, notation))
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn session_intent(state: &AppState, id: &str, intent: Intent) -> Result<IntentOut, LogicError> {
  let (result, session) = {
    let mut sessions = state.sessions.write().await;
    let entry = sessions
      .get_mut(id)
      .ok_or_else(|| LogicError::UnknownSession(id.to_string()))?;
    entry.last_access = std::time::Instant::now();
    let session = &mut entry.session;
    let result = apply_intent(session, &state.catalog, &intent, &mut rand::thread_rng()).map_err(|e| {
      warn!(target: "session", %id, error = %e, "Intent rejected");
      LogicError::Rejected(e)
    })?;
    (result, session.clone())
  };
  debug!(target: "session", %id, ?intent, ?result, "Intent applied");

  if matches!(intent, Intent::RestartLevel | Intent::NextLevel) {
    if let Some((scale_id, level)) = progress_key(&session) {
      state.record_progress(&scale_id, level).await;
    }
  }
  let notation = state.notation().await;
  Ok(IntentOut { result, session: snapshot(id, &session, &state.catalog, notation) })
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn end_session(state: &AppState, id: &str) -> Result<(), LogicError> {
  if state.remove_session(id).await {
    info!(target: "session", %id, "Session ended");
    Ok(())
  } else {
    Err(LogicError::UnknownSession(id.to_string()))
  }
}

pub async fn current_settings(state: &AppState) -> Settings {
  state.settings.read().await.clone()
}

pub async fn save_settings(state: &AppState, settings: Settings) -> Result<Settings, LogicError> {
  state.update_settings(settings).await.map_err(LogicError::Rejected)
}

/// Read-modify-write of the settings record (toggle sound, volume, notation).
pub async fn adjust_settings(state: &AppState, f: impl FnOnce(Settings) -> Settings) -> Result<Settings, LogicError> {
  state.modify_settings(f).await.map_err(LogicError::Rejected)
}

pub async fn clear_storage(state: &AppState) -> Result<Settings, LogicError> {
  state.clear_storage().await.map_err(LogicError::Rejected)
}

pub async fn current_progress(state: &AppState) -> UserProgress {
  let _guard = state.settings.read().await;
  state.store.load_progress()
}
