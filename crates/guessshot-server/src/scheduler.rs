//! Daily broadcast scheduler.
//!
//! Each [`ScheduleEntry`] gets its own task that sleeps until the entry's
//! next wall-clock time in the reference offset, runs the job, and repeats.
//! Missed firings (e.g. while the process was down) are not replayed.

use chrono::{DateTime, Days, FixedOffset, NaiveTime, Utc};
use guessshot_api::AppState;
use guessshot_core::{
  calendar,
  catalog::QuestionCatalog,
  engine::broadcast::{self, BroadcastReport},
  store::QuizStore,
  transport::ChatTransport,
};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::{Job, ScheduleEntry};

/// The first instant strictly after `now` whose wall-clock time in `offset`
/// is `at`.
pub fn next_fire(now: DateTime<Utc>, at: NaiveTime, offset: FixedOffset) -> DateTime<Utc> {
  let today = calendar::local_day(now, offset);
  let candidate = calendar::local_midnight(today, offset) + (at - NaiveTime::MIN);
  if candidate > now {
    return candidate;
  }
  let tomorrow = today.checked_add_days(Days::new(1)).unwrap_or(today);
  calendar::local_midnight(tomorrow, offset) + (at - NaiveTime::MIN)
}

/// Spawn one task per schedule entry.
pub fn spawn<S, C, T>(state: AppState<S, C, T>, schedule: Vec<ScheduleEntry>) -> Vec<JoinHandle<()>>
where
  S: QuizStore + 'static,
  C: QuestionCatalog + 'static,
  T: ChatTransport + 'static,
{
  schedule
    .into_iter()
    .map(|entry| tokio::spawn(run_entry(state.clone(), entry)))
    .collect()
}

async fn run_entry<S, C, T>(state: AppState<S, C, T>, entry: ScheduleEntry)
where
  S: QuizStore + 'static,
  C: QuestionCatalog + 'static,
  T: ChatTransport + 'static,
{
  let offset = state.config.reference_offset();
  loop {
    let now = Utc::now();
    let fire_at = next_fire(now, entry.at, offset);
    let wait = (fire_at - now).to_std().unwrap_or_default();
    info!(job = ?entry.job, at = %fire_at, "next scheduled run");
    tokio::time::sleep(wait).await;

    match run_job(&state, &entry.job).await {
      Ok(report) => info!(job = ?entry.job, delivered = report.delivered, "scheduled job done"),
      Err(e) => warn!(job = ?entry.job, error = %e, "scheduled job failed"),
    }
  }
}

/// Run one job now.
pub async fn run_job<S, C, T>(
  state: &AppState<S, C, T>,
  job: &Job,
) -> guessshot_core::Result<BroadcastReport>
where
  S: QuizStore,
  C: QuestionCatalog,
  T: ChatTransport,
{
  match job {
    Job::Reminder => broadcast::send_quiz_reminder(state.ctx(), state.transport.as_ref()).await,
    Job::Topic(topic) => {
      broadcast::send_topic_question(state.ctx(), state.transport.as_ref(), topic).await
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  fn moscow() -> FixedOffset { calendar::offset_from_minutes(180) }

  fn hm(h: u32, m: u32) -> NaiveTime { NaiveTime::from_hms_opt(h, m, 0).unwrap() }

  #[test]
  fn fires_later_today_when_time_is_ahead() {
    // 08:00 UTC is 11:00 in Moscow.
    let now = Utc.with_ymd_and_hms(2026, 10, 14, 8, 0, 0).unwrap();
    let next = next_fire(now, hm(11, 50), moscow());
    assert_eq!(next, Utc.with_ymd_and_hms(2026, 10, 14, 8, 50, 0).unwrap());
  }

  #[test]
  fn fires_tomorrow_when_time_has_passed() {
    let now = Utc.with_ymd_and_hms(2026, 10, 14, 15, 0, 0).unwrap();
    let next = next_fire(now, hm(12, 0), moscow());
    assert_eq!(next, Utc.with_ymd_and_hms(2026, 10, 15, 9, 0, 0).unwrap());
  }

  #[test]
  fn exact_fire_time_schedules_the_next_day() {
    let now = Utc.with_ymd_and_hms(2026, 10, 14, 9, 0, 0).unwrap();
    let next = next_fire(now, hm(12, 0), moscow());
    assert_eq!(next, Utc.with_ymd_and_hms(2026, 10, 15, 9, 0, 0).unwrap());
  }

  #[test]
  fn local_day_differs_from_utc_day_near_midnight() {
    // 22:30 UTC on the 14th is already 01:30 on the 15th in Moscow.
    let now = Utc.with_ymd_and_hms(2026, 10, 14, 22, 30, 0).unwrap();
    let next = next_fire(now, hm(0, 15), moscow());
    assert_eq!(next, Utc.with_ymd_and_hms(2026, 10, 15, 21, 15, 0).unwrap());
  }
}
