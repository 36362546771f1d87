//! User profiles: the mutable per-user aggregate.
//!
//! A profile is created on first contact and never deleted. Its counters are
//! only ever changed by the store, inside the same transaction that appends
//! the answer attempt responsible for the change.

use std::fmt;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::{badge::BadgeId, calendar};

// ─── Identity ────────────────────────────────────────────────────────────────

/// Stable chat identity of a user (the chat id on the transport side).
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
  Deserialize,
)]
#[serde(transparent)]
pub struct UserHandle(pub i64);

impl fmt::Display for UserHandle {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

// ─── Profile ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
  pub handle:             UserHandle,
  pub display_name:       Option<String>,
  pub locale:             String,
  /// Offset used to decide which calendar day an answer belongs to.
  pub utc_offset_minutes: i32,
  /// Lifetime correct answers.
  pub score:              u32,
  /// Consecutive correct answers since the last incorrect one.
  pub streak:             u32,
  /// Every scored attempt, correct or not. Always `>= score`.
  pub games_played:       u32,
  /// Unlocked badges in display order (oldest first).
  pub badges:             Vec<BadgeId>,
  /// Set once, at creation, from a `ref_<id>` payload.
  pub referrer:           Option<UserHandle>,
  pub referral_count:     u32,
  pub created_at:         DateTime<Utc>,
}

impl UserProfile {
  pub fn losses(&self) -> u32 { self.games_played.saturating_sub(self.score) }

  pub fn has_badge(&self, badge: &BadgeId) -> bool {
    self.badges.contains(badge)
  }

  pub fn utc_offset(&self) -> FixedOffset {
    calendar::offset_from_minutes(self.utc_offset_minutes)
  }
}

// ─── Registration ────────────────────────────────────────────────────────────

/// Input to [`crate::store::QuizStore::register`].
#[derive(Debug, Clone)]
pub struct NewProfile {
  pub handle:             UserHandle,
  pub display_name:       Option<String>,
  pub locale:             String,
  pub utc_offset_minutes: i32,
  /// Ignored unless the profile is being created and the referrer exists.
  pub referrer:           Option<UserHandle>,
}

/// Result of a first-contact registration.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
  pub profile:           UserProfile,
  /// `false` when the profile already existed; nothing was written.
  pub created:           bool,
  /// `true` when this call incremented the referrer's `referral_count`.
  pub referral_credited: bool,
}
