//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented; errors map onto HTTP statuses via `ApiError`.

use std::sync::Arc;
use axum::{
  extract::{Path, State},
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use tracing::{info, instrument, warn};

use crate::error::CoreError;
use crate::logic;
use crate::protocol::*;
use crate::state::AppState;

/// CoreError carried to the HTTP layer.
///
/// Mapping: unknown session -> 404; stage/lock conflicts and re-answers ->
/// 409; malformed input -> 400; source outage -> 503; generation trouble
/// (transport or rejected output) -> 502.
pub struct ApiError(pub CoreError);

impl From<CoreError> for ApiError {
  fn from(e: CoreError) -> Self {
    ApiError(e)
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self.0 {
      CoreError::UnknownSession(_) => StatusCode::NOT_FOUND,
      CoreError::WrongStage { .. }
      | CoreError::NoActiveMode
      | CoreError::AlreadyAnswered(_)
      | CoreError::StateConflict => StatusCode::CONFLICT,
      CoreError::InvalidInput(_)
      | CoreError::InputMismatch(_)
      | CoreError::OutOfRange { .. }
      | CoreError::UnknownWord(_) => StatusCode::BAD_REQUEST,
      CoreError::SourceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
      CoreError::GenerationFailed(_) | CoreError::GenerationInvalid(_) => StatusCode::BAD_GATEWAY,
    };
    if status.is_server_error() {
      warn!(target: "newslex_backend", %status, error = %self.0, "Request failed");
    }
    let body = Json(ErrorOut { error: self.0.to_string(), retryable: self.0.retryable() });
    (status, body).into_response()
  }
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_get_categories(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(CategoriesOut { categories: logic::list_categories(&state) })
}

#[instrument(level = "info", skip(state))]
pub async fn http_create_session(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let session = logic::create_session(&state).await;
  info!(target: "session", session = %session.id, "HTTP session created");
  (StatusCode::CREATED, Json(session))
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_get_session(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> ApiResult<SessionOut> {
  Ok(Json(logic::get_session(&state, &id).await?))
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_end_session(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> std::result::Result<StatusCode, ApiError> {
  logic::end_session(&state, &id).await?;
  Ok(StatusCode::NO_CONTENT)
}

#[instrument(level = "info", skip(state, body), fields(%id, category = %body.category))]
pub async fn http_load_article(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(body): Json<LoadArticleIn>,
) -> ApiResult<SessionOut> {
  Ok(Json(logic::load_article(&state, &id, &body.category).await?))
}

#[instrument(level = "info", skip(state, body), fields(%id, level = %body.level, count = body.count))]
pub async fn http_extract_vocabulary(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(body): Json<VocabularyIn>,
) -> ApiResult<SessionOut> {
  Ok(Json(logic::extract_vocabulary(&state, &id, &body.level, body.count).await?))
}

#[instrument(level = "info", skip(state, body), fields(%id, mode = ?body.mode))]
pub async fn http_enter_practice(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(body): Json<PracticeIn>,
) -> ApiResult<SessionOut> {
  Ok(Json(logic::enter_practice(&state, &id, body.mode).await?))
}

#[instrument(level = "info", skip(state, body), fields(%id))]
pub async fn http_advance(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(body): Json<AdvanceIn>,
) -> ApiResult<AdvanceOut> {
  let (outcome, session) = logic::advance(&state, &id, body.input).await?;
  Ok(Json(AdvanceOut { outcome, session }))
}

#[instrument(level = "info", skip(state, body), fields(%id, abandon = body.abandon))]
pub async fn http_complete(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(body): Json<CompleteIn>,
) -> ApiResult<SessionOut> {
  Ok(Json(logic::complete(&state, &id, body.abandon).await?))
}
