//! The scoring engine: validate and record one answer attempt.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use super::Context;
use crate::{
  Error, Result,
  answer::{AttemptWrite, NewAttempt, Outcome},
  calendar,
  catalog::QuestionCatalog,
  profile::UserHandle,
  question::Question,
  store::QuizStore,
};

/// One answer as received from the transport.
#[derive(Debug, Clone, Deserialize)]
pub struct Submission {
  pub user:          UserHandle,
  pub question_id:   u32,
  pub topic:         String,
  pub chosen_option: String,
  pub submitted_at:  DateTime<Utc>,
}

/// Score `submission`.
///
/// The first submission for a question on a given day (in the user's
/// offset) appends an attempt and updates the profile counters in one
/// transaction. Any later submission that day fails with
/// [`Error::AlreadyAnswered`] and writes nothing.
pub async fn submit_answer<S, C>(
  ctx: Context<'_, S, C>,
  submission: Submission,
) -> Result<Outcome>
where
  S: QuizStore,
  C: QuestionCatalog,
{
  let profile = ctx
    .store
    .get_profile(submission.user)
    .await
    .map_err(Error::store)?
    .ok_or(Error::ProfileNotFound(submission.user))?;

  let question = resolve(ctx, &submission, &profile.locale).await?;
  let correct = question.is_correct(&submission.chosen_option);
  let local_day = calendar::local_day(submission.submitted_at, profile.utc_offset());

  let write = ctx
    .store
    .record_attempt(NewAttempt {
      user: submission.user,
      question_id: question.id,
      topic: submission.topic.clone(),
      correct,
      answered_at: submission.submitted_at,
      local_day,
    })
    .await
    .map_err(Error::store)?;

  match write {
    AttemptWrite::Recorded { profile, .. } => {
      debug!(
        user = %submission.user,
        question = question.id,
        topic = %submission.topic,
        correct,
        streak = profile.streak,
        "answer scored"
      );
      Ok(Outcome {
        correct,
        canonical_answer: question.answer,
        fact: question.fact,
        streak: profile.streak,
        score: profile.score,
      })
    }
    AttemptWrite::Duplicate => {
      debug!(
        user = %submission.user,
        question = question.id,
        topic = %submission.topic,
        "duplicate answer rejected"
      );
      Err(Error::AlreadyAnswered {
        question_id: submission.question_id,
        topic:       submission.topic,
      })
    }
  }
}

/// Find the question and check the chosen option is one of its choices.
/// An unreadable catalog is treated the same as a missing question.
async fn resolve<S, C>(
  ctx: Context<'_, S, C>,
  submission: &Submission,
  locale: &str,
) -> Result<Question>
where
  S: QuizStore,
  C: QuestionCatalog,
{
  let not_found = || Error::QuestionNotFound {
    question_id: submission.question_id,
    topic:       submission.topic.clone(),
  };

  let questions = ctx
    .catalog
    .fetch(&submission.topic, locale)
    .await
    .map_err(|_| not_found())?;

  questions
    .into_iter()
    .find(|q| q.id == submission.question_id)
    .filter(|q| q.accepts(&submission.chosen_option))
    .ok_or_else(not_found)
}
