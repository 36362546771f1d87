//! Handler for `GET /leaderboard/:window[?view=menu|command]`.
//!
//! `window` is one of `day`, `week`, `month`. The menu view is shorter than
//! the command view; see [`guessshot_core::config::QuizConfig::top_n`].

use axum::{
  Json,
  extract::{Path, Query, State},
};
use chrono::Utc;
use guessshot_core::{
  catalog::QuestionCatalog,
  engine::leaderboard,
  ranking::{Leaderboard, View, Window},
  store::QuizStore,
  transport::ChatTransport,
};
use serde::Deserialize;

use crate::{AppState, auth::Authenticated, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct Params {
  #[serde(default)]
  pub view: View,
}

/// `GET /leaderboard/:window`
pub async fn handler<S, C, T>(
  _auth: Authenticated,
  State(state): State<AppState<S, C, T>>,
  Path(window): Path<String>,
  Query(params): Query<Params>,
) -> Result<Json<Leaderboard>, ApiError>
where
  S: QuizStore + 'static,
  C: QuestionCatalog + 'static,
  T: ChatTransport + 'static,
{
  let window: Window = window
    .parse()
    .map_err(|_| ApiError::BadRequest(format!("unknown window: {window:?}")))?;
  let board = leaderboard::rank(state.ctx(), window, params.view, Utc::now()).await?;
  Ok(Json(board))
}
