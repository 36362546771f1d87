//! Scheduled broadcasts to every profile.
//!
//! A failure for one user is logged and counted, never propagated; the loop
//! always moves on to the next user. There is no retry within a cycle.

use serde::Serialize;
use tracing::{info, warn};

use super::{Context, delivery::select_next};
use crate::{
  Error, Result,
  catalog::QuestionCatalog,
  delivery::Selection,
  store::QuizStore,
  transport::{ChatTransport, Notice},
};

/// Per-cycle tallies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BroadcastReport {
  pub delivered: u32,
  /// Users with no unsent question left for the topic.
  pub exhausted: u32,
  pub failed:    u32,
}

/// Send each user the next unsent question for `topic`.
pub async fn send_topic_question<S, C, T>(
  ctx: Context<'_, S, C>,
  transport: &T,
  topic: &str,
) -> Result<BroadcastReport>
where
  S: QuizStore,
  C: QuestionCatalog,
  T: ChatTransport,
{
  if !ctx.config.supports_topic(topic) {
    return Err(Error::UnknownTopic(topic.to_owned()));
  }

  let profiles = ctx.store.list_profiles().await.map_err(Error::store)?;
  let mut report = BroadcastReport::default();

  for profile in &profiles {
    let user = profile.handle;
    match select_next(ctx, user, topic, &profile.locale).await {
      Ok(Selection::Question(question)) => {
        match transport.send_question(profile, topic, &question).await {
          Ok(()) => report.delivered += 1,
          Err(e) => {
            warn!(%user, %topic, error = %e, "question delivery failed");
            report.failed += 1;
          }
        }
      }
      Ok(Selection::Exhausted) => report.exhausted += 1,
      Err(e) => {
        warn!(%user, %topic, error = %e, "question selection failed");
        report.failed += 1;
      }
    }
  }

  info!(
    %topic,
    delivered = report.delivered,
    exhausted = report.exhausted,
    failed = report.failed,
    "topic broadcast finished"
  );
  Ok(report)
}

/// Send every user the pre-quiz reminder.
pub async fn send_quiz_reminder<S, C, T>(
  ctx: Context<'_, S, C>,
  transport: &T,
) -> Result<BroadcastReport>
where
  S: QuizStore,
  C: QuestionCatalog,
  T: ChatTransport,
{
  let profiles = ctx.store.list_profiles().await.map_err(Error::store)?;
  let mut report = BroadcastReport::default();

  for profile in &profiles {
    match transport.send_notice(profile, Notice::QuizReminder).await {
      Ok(()) => report.delivered += 1,
      Err(e) => {
        warn!(user = %profile.handle, error = %e, "reminder delivery failed");
        report.failed += 1;
      }
    }
  }

  info!(delivered = report.delivered, failed = report.failed, "reminder broadcast finished");
  Ok(report)
}
