//! Badges and the declarative rule table that unlocks them.
//!
//! A rule is data: a badge, a measured quantity, and a threshold. The
//! achievement engine interprets the table; nothing here captures state.
//! Once a badge is on a profile it stays there.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{engine::metrics::DerivedMetrics, profile::UserProfile, ranking::Window};

// ─── Identity ────────────────────────────────────────────────────────────────

/// A badge identifier. By convention a single emoji, which is also how the
/// badge is displayed.
#[derive(
  Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct BadgeId(pub String);

impl BadgeId {
  pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl From<&str> for BadgeId {
  fn from(id: &str) -> Self { Self(id.to_owned()) }
}

impl fmt::Display for BadgeId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

// ─── Rules ───────────────────────────────────────────────────────────────────

/// The quantity a [`BadgeRule`] compares against its threshold.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RuleKind {
  /// Current win streak.
  Streak,
  /// Lifetime scored attempts.
  GamesPlayed,
  /// Users who joined with this user's referral code.
  Referrals,
  /// Consecutive recent days with at least one attempt.
  AnswerStreakDays,
  /// Consecutive recent days with attempts but no correct answer.
  NoWinStreakDays,
}

impl RuleKind {
  pub fn measure(self, profile: &UserProfile, metrics: &DerivedMetrics) -> u32 {
    match self {
      Self::Streak => profile.streak,
      Self::GamesPlayed => profile.games_played,
      Self::Referrals => profile.referral_count,
      Self::AnswerStreakDays => metrics.answer_streak_days,
      Self::NoWinStreakDays => metrics.no_win_streak_days,
    }
  }
}

/// One row of the achievement table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeRule {
  pub badge:     BadgeId,
  pub kind:      RuleKind,
  /// Unlocks when the measured value is at least this.
  pub threshold: u32,
  /// Locale key for the badge's display name.
  pub name_key:  String,
}

impl BadgeRule {
  pub fn new(badge: &str, kind: RuleKind, threshold: u32, name_key: &str) -> Self {
    Self {
      badge: BadgeId::from(badge),
      kind,
      threshold,
      name_key: name_key.to_owned(),
    }
  }

  pub fn is_met(&self, profile: &UserProfile, metrics: &DerivedMetrics) -> bool {
    self.kind.measure(profile, metrics) >= self.threshold
  }
}

/// The built-in achievement table, in evaluation order.
pub fn default_rules() -> Vec<BadgeRule> {
  vec![
    BadgeRule::new("🧠", RuleKind::Streak, 5, "ach_brain"),
    BadgeRule::new("🌍", RuleKind::GamesPlayed, 10, "ach_explorer"),
    BadgeRule::new("🎓", RuleKind::GamesPlayed, 50, "ach_veteran"),
    BadgeRule::new("🤝", RuleKind::Referrals, 3, "ach_recruiter"),
    BadgeRule::new("🔥", RuleKind::AnswerStreakDays, 7, "ach_regular"),
    BadgeRule::new("🌧️", RuleKind::NoWinStreakDays, 3, "ach_persistent"),
  ]
}

// ─── Placement ───────────────────────────────────────────────────────────────

/// A badge awarded for a leaderboard rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementBadge {
  pub badge:    BadgeId,
  pub name_key: String,
}

impl PlacementBadge {
  fn new(badge: &str, name_key: &str) -> Self {
    Self { badge: BadgeId::from(badge), name_key: name_key.to_owned() }
  }
}

/// Placement badges per window; index 0 goes to rank 1, and so on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementBadges {
  pub day:   Vec<PlacementBadge>,
  pub week:  Vec<PlacementBadge>,
  pub month: Vec<PlacementBadge>,
}

impl PlacementBadges {
  pub fn for_window(&self, window: Window) -> &[PlacementBadge] {
    match window {
      Window::Day => &self.day,
      Window::Week => &self.week,
      Window::Month => &self.month,
    }
  }

  pub fn iter(&self) -> impl Iterator<Item = &PlacementBadge> {
    self.day.iter().chain(&self.week).chain(&self.month)
  }
}

impl Default for PlacementBadges {
  fn default() -> Self {
    Self {
      day:   vec![PlacementBadge::new("🥇", "winner_medal")],
      week:  vec![
        PlacementBadge::new("🏆", "week_gold"),
        PlacementBadge::new("🥈", "week_silver"),
        PlacementBadge::new("🥉", "week_bronze"),
      ],
      month: vec![
        PlacementBadge::new("👑", "month_gold"),
        PlacementBadge::new("💎", "month_silver"),
        PlacementBadge::new("🌟", "month_bronze"),
      ],
    }
  }
}
