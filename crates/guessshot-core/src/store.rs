//! The `QuizStore` trait.
//!
//! Implemented by storage backends (e.g. `guessshot-store-sqlite`). The
//! engines in [`crate::engine`] are stateless operators over this trait.
//!
//! Every method that changes more than one row must do so atomically. Two
//! calls for the same user never interleave their read-check with their
//! write; calls for different users need no coordination.

use std::{collections::HashSet, future::Future};

use chrono::NaiveDate;

use crate::{
  answer::{AttemptWrite, DayActivity, NewAttempt},
  badge::BadgeId,
  delivery::{DeliveryRecord, NewDelivery},
  profile::{NewProfile, Registration, UserHandle, UserProfile},
  ranking::{Standing, WindowBounds},
};

/// Abstraction over a quiz store backend.
///
/// Answer attempts and delivery records are append-only. Profile counters
/// change only as a side effect of [`QuizStore::record_attempt`] and
/// [`QuizStore::register`]; badges only accumulate.
pub trait QuizStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Profiles ──────────────────────────────────────────────────────────

  /// Create the profile if absent. On creation, if `input.referrer` names
  /// an existing other profile, link it and increment its referral count
  /// by one. An existing profile is returned untouched.
  fn register(
    &self,
    input: NewProfile,
  ) -> impl Future<Output = Result<Registration, Self::Error>> + Send + '_;

  fn get_profile(
    &self,
    user: UserHandle,
  ) -> impl Future<Output = Result<Option<UserProfile>, Self::Error>> + Send + '_;

  /// All profiles, ordered by handle.
  fn list_profiles(
    &self,
  ) -> impl Future<Output = Result<Vec<UserProfile>, Self::Error>> + Send + '_;

  /// Returns the updated profile, or `None` if it does not exist.
  fn set_locale(
    &self,
    user: UserHandle,
    locale: String,
  ) -> impl Future<Output = Result<Option<UserProfile>, Self::Error>> + Send + '_;

  // ── Answer ledger ─────────────────────────────────────────────────────

  /// Append an attempt and apply its counter changes in one transaction:
  /// `games_played + 1`, and either `score + 1, streak + 1` or
  /// `streak = 0`. Returns [`AttemptWrite::Duplicate`] without writing if
  /// the `(user, question_id, topic, local_day)` key already exists.
  fn record_attempt(
    &self,
    input: NewAttempt,
  ) -> impl Future<Output = Result<AttemptWrite, Self::Error>> + Send + '_;

  /// Per-day totals for `user` on or after `since`, any order. Days without
  /// attempts are absent.
  fn daily_activity(
    &self,
    user: UserHandle,
    since: NaiveDate,
  ) -> impl Future<Output = Result<Vec<DayActivity>, Self::Error>> + Send + '_;

  /// Correct attempts per user inside `bounds`. Users with none are absent.
  fn correct_counts(
    &self,
    bounds: WindowBounds,
  ) -> impl Future<Output = Result<Vec<Standing>, Self::Error>> + Send + '_;

  // ── Badges ────────────────────────────────────────────────────────────

  /// Add `badges` to the user's set in a single write, skipping any
  /// already present. Returns only the badges this call added.
  fn award_badges<'a>(
    &'a self,
    user: UserHandle,
    badges: &'a [BadgeId],
  ) -> impl Future<Output = Result<Vec<BadgeId>, Self::Error>> + Send + 'a;

  // ── Delivery history ──────────────────────────────────────────────────

  fn delivered_question_ids<'a>(
    &'a self,
    user: UserHandle,
    topic: &'a str,
  ) -> impl Future<Output = Result<HashSet<u32>, Self::Error>> + Send + 'a;

  /// Record a delivery unless `(user, topic, question_id)` is already in
  /// the history. Returns `None` when another caller got there first.
  fn record_delivery(
    &self,
    input: NewDelivery,
  ) -> impl Future<Output = Result<Option<DeliveryRecord>, Self::Error>> + Send + '_;
}
