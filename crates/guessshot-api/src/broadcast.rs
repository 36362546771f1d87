//! Handlers for the scheduled broadcast jobs, for manual triggering.

use axum::{
  Json,
  extract::{Path, State},
};
use guessshot_core::{
  catalog::QuestionCatalog,
  engine::broadcast::{self, BroadcastReport},
  store::QuizStore,
  transport::ChatTransport,
};

use crate::{AppState, auth::Authenticated, error::ApiError};

/// `POST /broadcast/topic/:topic`
pub async fn topic<S, C, T>(
  _auth: Authenticated,
  State(state): State<AppState<S, C, T>>,
  Path(topic): Path<String>,
) -> Result<Json<BroadcastReport>, ApiError>
where
  S: QuizStore + 'static,
  C: QuestionCatalog + 'static,
  T: ChatTransport + 'static,
{
  let report =
    broadcast::send_topic_question(state.ctx(), state.transport.as_ref(), &topic).await?;
  Ok(Json(report))
}

/// `POST /broadcast/reminder`
pub async fn reminder<S, C, T>(
  _auth: Authenticated,
  State(state): State<AppState<S, C, T>>,
) -> Result<Json<BroadcastReport>, ApiError>
where
  S: QuizStore + 'static,
  C: QuestionCatalog + 'static,
  T: ChatTransport + 'static,
{
  let report = broadcast::send_quiz_reminder(state.ctx(), state.transport.as_ref()).await?;
  Ok(Json(report))
}
