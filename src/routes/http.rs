//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs parameters and basic result info.

use std::sync::Arc;
use axum::{extract::{Path, State}, http::StatusCode, Json, response::IntoResponse};
use tracing::{info, instrument};

use crate::logic::*;
use crate::protocol::*;
use crate::settings::Settings;
use crate::state::AppState;

type ApiError = (StatusCode, Json<ErrorOut>);

fn api_error(e: LogicError) -> ApiError {
  let status = match e {
    LogicError::UnknownSession(_) => StatusCode::NOT_FOUND,
    LogicError::Rejected(_) => StatusCode::BAD_REQUEST,
  };
  (status, Json(ErrorOut { error: e.to_string() }))
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_get_catalog(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let notation = state.notation().await;
  Json(catalog_out(&state.catalog, notation))
}

#[instrument(level = "info", skip(state, body), fields(scale_id = ?body.scale_id, level = body.level, mixed = body.mixed))]
pub async fn http_post_session(
  State(state): State<Arc<AppState>>,
  Json(body): Json<StartSessionIn>,
) -> Result<(StatusCode, Json<SessionSnapshot>), ApiError> {
  let snap = create_session(&state, body).await.map_err(api_error)?;
  info!(target: "session", id = %snap.session_id, total = snap.total, "HTTP session started");
  Ok((StatusCode::CREATED, Json(snap)))
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_get_session(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, ApiError> {
  session_snapshot(&state, &id).await.map(Json).map_err(api_error)
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_delete_session(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
  end_session(&state, &id).await.map_err(api_error)?;
  Ok(StatusCode::NO_CONTENT)
}

#[instrument(level = "info", skip(state, body), fields(%id, intent = ?body))]
pub async fn http_post_intent(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(body): Json<Intent>,
) -> Result<Json<IntentOut>, ApiError> {
  let out = session_intent(&state, &id, body).await.map_err(api_error)?;
  if let Some(result) = &out.result {
    info!(target: "session", %id, ?result, status = ?out.session.answer_status, "HTTP submit evaluated");
  }
  Ok(Json(out))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_settings(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(current_settings(&state).await)
}

#[instrument(level = "info", skip(state))]
pub async fn http_put_settings(
  State(state): State<Arc<AppState>>,
  Json(body): Json<Settings>,
) -> Result<Json<Settings>, ApiError> {
  save_settings(&state, body).await.map(Json).map_err(api_error)
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_progress(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(current_progress(&state).await)
}

#[instrument(level = "info", skip(state))]
pub async fn http_delete_storage(State(state): State<Arc<AppState>>) -> Result<Json<Settings>, ApiError> {
  let settings = clear_storage(&state).await.map_err(api_error)?;
  info!(target: "settings", "Stored settings and progress cleared");
  Ok(Json(settings))
}
