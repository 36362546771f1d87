//! The leaderboard engine: windowed rankings and placement badges.

use std::slice;

use chrono::{DateTime, Utc};
use tracing::info;

use super::Context;
use crate::{
  Error, Result,
  catalog::QuestionCatalog,
  ranking::{Leaderboard, Placement, Standing, View, Window},
  store::QuizStore,
};

/// Sort by correct count descending, then by ascending user handle.
pub fn order_standings(standings: &mut [Standing]) {
  standings.sort_by(|a, b| b.correct.cmp(&a.correct).then(a.user.cmp(&b.user)));
}

/// Rank users by correct answers inside the `window` containing `now`.
///
/// Placement badges go to the leading users (rank 1 for days, ranks 1–3 for
/// weeks and months). Each is written only if the user lacks it, so
/// repeated calls inside a window change nothing after the first.
pub async fn rank<S, C>(
  ctx: Context<'_, S, C>,
  window: Window,
  view: View,
  now: DateTime<Utc>,
) -> Result<Leaderboard>
where
  S: QuizStore,
  C: QuestionCatalog,
{
  let bounds = window.bounds(now, ctx.config.reference_offset());
  let mut standings = ctx
    .store
    .correct_counts(bounds)
    .await
    .map_err(Error::store)?;
  standings.retain(|s| s.correct > 0);

  if standings.is_empty() {
    return Ok(Leaderboard::NoActivity { window, bounds });
  }

  order_standings(&mut standings);
  let awarded = award_placements(ctx, window, &standings).await?;
  standings.truncate(ctx.config.top_n(view));

  Ok(Leaderboard::Ranked { window, bounds, standings, awarded })
}

async fn award_placements<S, C>(
  ctx: Context<'_, S, C>,
  window: Window,
  standings: &[Standing],
) -> Result<Vec<Placement>>
where
  S: QuizStore,
  C: QuestionCatalog,
{
  let mut awarded = Vec::new();
  let placements = ctx.config.placement_badges.for_window(window);

  for (rank, (standing, placement)) in (1..).zip(standings.iter().zip(placements)) {
    let added = ctx
      .store
      .award_badges(standing.user, slice::from_ref(&placement.badge))
      .await
      .map_err(Error::store)?;

    if !added.is_empty() {
      info!(user = %standing.user, %window, rank, badge = %placement.badge, "placement awarded");
      awarded.push(Placement {
        user: standing.user,
        rank,
        badge: placement.badge.clone(),
      });
    }
  }

  Ok(awarded)
}
