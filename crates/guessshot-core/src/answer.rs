//! Answer attempts: the append-only scoring ledger.
//!
//! An attempt is never updated or deleted. At most one attempt exists per
//! `(user, question, topic, local_day)`; the store enforces this with a
//! uniqueness constraint and reports a collision as
//! [`AttemptWrite::Duplicate`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::profile::{UserHandle, UserProfile};

/// One scored response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerAttempt {
  pub attempt_id:  Uuid,
  pub user:        UserHandle,
  pub question_id: u32,
  pub topic:       String,
  pub correct:     bool,
  pub answered_at: DateTime<Utc>,
  /// Calendar day of `answered_at` in the user's offset at the time of
  /// answering. Keys the once-per-day guarantee.
  pub local_day:   NaiveDate,
}

/// Input to [`crate::store::QuizStore::record_attempt`].
#[derive(Debug, Clone)]
pub struct NewAttempt {
  pub user:        UserHandle,
  pub question_id: u32,
  pub topic:       String,
  pub correct:     bool,
  pub answered_at: DateTime<Utc>,
  pub local_day:   NaiveDate,
}

/// What happened to a [`NewAttempt`].
#[derive(Debug, Clone)]
pub enum AttemptWrite {
  /// The attempt was appended and the profile counters updated, atomically.
  Recorded {
    attempt: AnswerAttempt,
    profile: UserProfile,
  },
  /// An attempt for the same question already exists on that day. Nothing
  /// was written.
  Duplicate,
}

/// The caller-facing result of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
  pub correct:          bool,
  pub canonical_answer: String,
  pub fact:             Option<String>,
  /// Streak and score after this attempt.
  pub streak:           u32,
  pub score:            u32,
}

/// Per-day attempt totals for one user, used by the derived metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayActivity {
  pub day:      NaiveDate,
  pub attempts: u32,
  pub correct:  u32,
}
