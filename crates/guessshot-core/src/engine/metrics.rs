//! Derived metrics over a user's recent answer history.
//!
//! Computed on demand and returned as values; never stored on the profile.

use std::collections::HashMap;

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::Serialize;

use crate::{
  Error, Result,
  answer::DayActivity,
  calendar,
  config::QuizConfig,
  profile::UserProfile,
  store::QuizStore,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DerivedMetrics {
  /// Consecutive days, ending today, with at least one attempt.
  pub answer_streak_days: u32,
  /// Consecutive days, ending today, with attempts but none correct.
  pub no_win_streak_days: u32,
}

/// Count back from `today` while each day has any attempt, up to
/// `lookback` days.
pub fn answer_streak(activity: &[DayActivity], today: NaiveDate, lookback: u32) -> u32 {
  consecutive_days(activity, today, lookback, |d| d.attempts > 0)
}

/// Count back from `today` while each day has attempts and zero correct
/// ones, up to `lookback` days.
pub fn no_win_streak(activity: &[DayActivity], today: NaiveDate, lookback: u32) -> u32 {
  consecutive_days(activity, today, lookback, |d| d.attempts > 0 && d.correct == 0)
}

fn consecutive_days(
  activity: &[DayActivity],
  today: NaiveDate,
  lookback: u32,
  qualifies: impl Fn(&DayActivity) -> bool,
) -> u32 {
  let by_day: HashMap<NaiveDate, &DayActivity> =
    activity.iter().map(|d| (d.day, d)).collect();

  let mut count = 0;
  let mut day = today;
  while count < lookback {
    match by_day.get(&day) {
      Some(d) if qualifies(d) => count += 1,
      _ => break,
    }
    let Some(previous) = day.pred_opt() else { break };
    day = previous;
  }
  count
}

/// Load the recent history for `profile` and compute its metrics as of
/// `now`, in the profile's own offset.
pub async fn derive<S: QuizStore>(
  store: &S,
  config: &QuizConfig,
  profile: &UserProfile,
  now: DateTime<Utc>,
) -> Result<DerivedMetrics> {
  let today = calendar::local_day(now, profile.utc_offset());
  let span = config.metrics_lookback_days().saturating_sub(1);
  let since = today
    .checked_sub_days(Days::new(u64::from(span)))
    .unwrap_or(today);

  let activity = store
    .daily_activity(profile.handle, since)
    .await
    .map_err(Error::store)?;

  Ok(DerivedMetrics {
    answer_streak_days: answer_streak(&activity, today, config.answer_streak_lookback_days),
    no_win_streak_days: no_win_streak(&activity, today, config.no_win_lookback_days),
  })
}
