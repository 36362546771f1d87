//! Handler for `POST /answers`.
//!
//! Body: `{"user":42,"question_id":7,"topic":"movies","chosen_option":"Stalker"}`.
//! The answer is timestamped when the request is handled; any client-side
//! timestamp in the body is ignored.

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
};
use chrono::Utc;
use guessshot_core::{
  answer::Outcome,
  badge::BadgeId,
  catalog::QuestionCatalog,
  engine::{
    achievements,
    scoring::{self, Submission},
  },
  profile::UserHandle,
  store::QuizStore,
  transport::ChatTransport,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{AppState, auth::Authenticated, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct AnswerBody {
  pub user:          UserHandle,
  pub question_id:   u32,
  pub topic:         String,
  pub chosen_option: String,
}

#[derive(Debug, Serialize)]
pub struct AnswerResponse {
  #[serde(flatten)]
  pub outcome:  Outcome,
  /// Badges unlocked by this answer.
  pub unlocked: Vec<BadgeId>,
}

/// `POST /answers`
///
/// Scores the answer, then evaluates achievements. The answer stays
/// recorded even if the evaluation fails; `unlocked` is then empty and the
/// badges are picked up by the next evaluation.
pub async fn submit<S, C, T>(
  _auth: Authenticated,
  State(state): State<AppState<S, C, T>>,
  body: Result<Json<AnswerBody>, JsonRejection>,
) -> Result<Json<AnswerResponse>, ApiError>
where
  S: QuizStore + 'static,
  C: QuestionCatalog + 'static,
  T: ChatTransport + 'static,
{
  let Json(body) = body?;
  let now = Utc::now();
  let user = body.user;

  let outcome = scoring::submit_answer(
    state.ctx(),
    Submission {
      user,
      question_id: body.question_id,
      topic: body.topic,
      chosen_option: body.chosen_option,
      submitted_at: now,
    },
  )
  .await?;

  let unlocked = match achievements::evaluate(state.ctx(), user, now).await {
    Ok(evaluation) => evaluation.unlocked,
    Err(e) => {
      warn!(%user, error = %e, "achievement evaluation failed");
      Vec::new()
    }
  };

  Ok(Json(AnswerResponse { outcome, unlocked }))
}
