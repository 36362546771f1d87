//! The delivery selector: pick an unsent question for a user.
//!
//! The selection is recorded before it is returned. If the transport then
//! fails, that question is never offered to the user again; a lost question
//! is preferred over a repeated one.

use chrono::Utc;
use rand::seq::SliceRandom as _;
use tracing::{debug, warn};

use super::Context;
use crate::{
  Error, Result,
  catalog::QuestionCatalog,
  delivery::{NewDelivery, PlayRound, Selection},
  profile::UserHandle,
  question::Question,
  store::QuizStore,
};

/// Choose uniformly among the questions of `(topic, locale)` not yet
/// delivered to `user` on `topic`, and record the choice.
pub async fn select_next<S, C>(
  ctx: Context<'_, S, C>,
  user: UserHandle,
  topic: &str,
  locale: &str,
) -> Result<Selection>
where
  S: QuizStore,
  C: QuestionCatalog,
{
  if !ctx.config.supports_topic(topic) {
    return Err(Error::UnknownTopic(topic.to_owned()));
  }

  let questions = match ctx.catalog.fetch(topic, locale).await {
    Ok(questions) => questions,
    Err(e) => {
      warn!(%user, error = %e, "catalog unavailable; treating topic as exhausted");
      return Ok(Selection::Exhausted);
    }
  };

  let mut sent = ctx
    .store
    .delivered_question_ids(user, topic)
    .await
    .map_err(Error::store)?;

  // A concurrent caller may claim the picked question first; the store
  // refuses the second record and we pick again from what is left.
  loop {
    let remaining: Vec<&Question> =
      questions.iter().filter(|q| !sent.contains(&q.id)).collect();

    let Some(question) = pick(&remaining) else {
      return Ok(Selection::Exhausted);
    };

    let recorded = ctx
      .store
      .record_delivery(NewDelivery {
        user,
        question_id: question.id,
        topic: topic.to_owned(),
        sent_at: Utc::now(),
      })
      .await
      .map_err(Error::store)?;

    if recorded.is_some() {
      return Ok(Selection::Question(question));
    }
    debug!(%user, topic, question_id = question.id, "question claimed concurrently");
    sent.insert(question.id);
  }
}

/// Pick a random configured topic and select from it in the user's locale.
/// With no topics configured the round has no topic and is exhausted.
pub async fn play<S, C>(ctx: Context<'_, S, C>, user: UserHandle) -> Result<PlayRound>
where
  S: QuizStore,
  C: QuestionCatalog,
{
  let profile = ctx
    .store
    .get_profile(user)
    .await
    .map_err(Error::store)?
    .ok_or(Error::ProfileNotFound(user))?;

  let topic = {
    let mut rng = rand::thread_rng();
    ctx.config.topics.choose(&mut rng).cloned()
  };

  let Some(topic) = topic else {
    return Ok(PlayRound { topic: None, selection: Selection::Exhausted });
  };

  let selection = select_next(ctx, user, &topic, &profile.locale).await?;
  Ok(PlayRound { topic: Some(topic), selection })
}

fn pick(remaining: &[&Question]) -> Option<Question> {
  let mut rng = rand::thread_rng();
  remaining.choose(&mut rng).map(|q| (*q).clone())
}
