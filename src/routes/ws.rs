//! WebSocket upgrade + message loop. Each connection owns one drill session;
//! every client message is parsed as JSON, applied, and answered with a single
//! JSON message.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::engine::Session;
use crate::logic::{adjust_settings, apply_intent, clear_storage, current_settings, progress_key, save_settings, start, LogicError};
use crate::protocol::{snapshot, ClientWsMessage, ControlMessage, Intent, ServerWsMessage, StartSessionIn};
use crate::settings::Settings;
use crate::state::AppState;
use crate::util::trunc_for_log;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "tonedoku_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  let conn_id = Uuid::new_v4().to_string();
  let mut session = Session::new();
  info!(target: "tonedoku_backend", %conn_id, "WebSocket connected");

  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        // Parse, dispatch, serialize response.
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target: "tonedoku_backend", %conn_id, msg = %trunc_for_log(&txt, 200), "WS received");
            handle_client_ws(incoming, &state, &mut session, &conn_id).await
          }
          Err(e) => ServerWsMessage::Error { message: format!("Invalid message: {}", e) },
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "tonedoku_backend", %conn_id, error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "tonedoku_backend", %conn_id, "WebSocket disconnected");
}

#[instrument(level = "info", skip(state, session))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState, session: &mut Session, conn_id: &str) -> ServerWsMessage {
  let notation = state.notation().await;
  match msg {
    ClientWsMessage::Control(ControlMessage::Ping) => ServerWsMessage::Pong,

    ClientWsMessage::Control(ControlMessage::StartSession { scale_id, level }) => {
      let req = StartSessionIn { scale_id: Some(scale_id), level, mixed: false };
      start_ws(req, state, session, conn_id).await
    }

    ClientWsMessage::Control(ControlMessage::StartMixedSession { level }) => {
      let req = StartSessionIn { scale_id: None, level, mixed: true };
      start_ws(req, state, session, conn_id).await
    }

    ClientWsMessage::Control(ControlMessage::GetSession) => ServerWsMessage::Session {
      session: snapshot(conn_id, session, &state.catalog, notation),
    },

    ClientWsMessage::Control(ControlMessage::EndSession) => {
      session.reset_session();
      info!(target: "session", %conn_id, "WS session ended");
      ServerWsMessage::Ended
    }

    ClientWsMessage::Control(ControlMessage::GetSettings) => ServerWsMessage::Settings {
      settings: current_settings(state).await,
    },

    ClientWsMessage::Control(ControlMessage::SaveSettings { settings }) => settings_reply(save_settings(state, settings).await),

    ClientWsMessage::Control(ControlMessage::ToggleSound) => {
      settings_reply(adjust_settings(state, Settings::toggled_sound).await)
    }

    ClientWsMessage::Control(ControlMessage::SetVolume { volume }) => {
      settings_reply(adjust_settings(state, |s| s.with_volume(volume)).await)
    }

    ClientWsMessage::Control(ControlMessage::SetNotation { notation }) => {
      settings_reply(adjust_settings(state, |s| s.with_notation(notation)).await)
    }

    ClientWsMessage::Control(ControlMessage::ClearStorage) => settings_reply(clear_storage(state).await),

    ClientWsMessage::Intent(_) if !session.is_initialized() => ServerWsMessage::Error {
      message: "No active session: send start_session or start_mixed_session first.".into(),
    },

    ClientWsMessage::Intent(intent) => {
      let applied = apply_intent(session, &state.catalog, &intent, &mut rand::thread_rng());
      match applied {
        Ok(result) => {
          if matches!(intent, Intent::RestartLevel | Intent::NextLevel) {
            if let Some((scale_id, level)) = progress_key(session) {
              state.record_progress(&scale_id, level).await;
            }
          }
          let snap = snapshot(conn_id, session, &state.catalog, notation);
          match result {
            Some(result) => {
              info!(target: "session", %conn_id, ?result, "WS submit evaluated");
              ServerWsMessage::SubmitResult { result, session: snap }
            }
            None => ServerWsMessage::Session { session: snap },
          }
        }
        Err(message) => ServerWsMessage::Error { message },
      }
    }
  }
}

fn settings_reply(result: Result<Settings, LogicError>) -> ServerWsMessage {
  match result {
    Ok(settings) => ServerWsMessage::Settings { settings },
    Err(e) => ServerWsMessage::Error { message: e.to_string() },
  }
}

async fn start_ws(req: StartSessionIn, state: &AppState, session: &mut Session, conn_id: &str) -> ServerWsMessage {
  let started = start(session, &state.catalog, &req, &mut rand::thread_rng());
  if let Err(message) = started {
    return ServerWsMessage::Error { message };
  }
  if let Some((scale_id, level)) = progress_key(session) {
    state.record_progress(&scale_id, level).await;
  }
  info!(target: "session", %conn_id, mixed = req.mixed, level = req.level, total = session.total_questions(), "WS session started");
  let notation = state.notation().await;
  ServerWsMessage::Session { session: snapshot(conn_id, session, &state.catalog, notation) }
}
