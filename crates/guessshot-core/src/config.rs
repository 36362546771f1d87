//! Quiz configuration, threaded explicitly into every engine call.
//!
//! Every field has a default, so an empty `[quiz]` table (or none at all)
//! yields the stock two-topic, two-locale setup.

use chrono::FixedOffset;
use serde::Deserialize;

use crate::{
  badge::{BadgeId, BadgeRule, PlacementBadges, default_rules},
  calendar,
  ranking::View,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QuizConfig {
  /// Offset used for leaderboard windows and the broadcast schedule.
  pub reference_utc_offset_minutes:    i32,
  /// Offset given to newly created profiles.
  pub default_user_utc_offset_minutes: i32,
  pub topics:                          Vec<String>,
  pub locales:                         Vec<String>,
  pub default_locale:                  String,
  pub menu_top_n:                      usize,
  pub command_top_n:                   usize,
  pub no_win_lookback_days:            u32,
  pub answer_streak_lookback_days:     u32,
  pub badge_rules:                     Vec<BadgeRule>,
  pub placement_badges:                PlacementBadges,
}

impl Default for QuizConfig {
  fn default() -> Self {
    Self {
      reference_utc_offset_minutes:    180,
      default_user_utc_offset_minutes: 180,
      topics:                          vec!["movies".into(), "cities".into()],
      locales:                         vec!["ru".into(), "en".into()],
      default_locale:                  "ru".into(),
      menu_top_n:                      5,
      command_top_n:                   10,
      no_win_lookback_days:            3,
      answer_streak_lookback_days:     7,
      badge_rules:                     default_rules(),
      placement_badges:                PlacementBadges::default(),
    }
  }
}

impl QuizConfig {
  pub fn reference_offset(&self) -> FixedOffset {
    calendar::offset_from_minutes(self.reference_utc_offset_minutes)
  }

  pub fn supports_topic(&self, topic: &str) -> bool {
    self.topics.iter().any(|t| t == topic)
  }

  pub fn supports_locale(&self, locale: &str) -> bool {
    self.locales.iter().any(|l| l == locale)
  }

  pub fn top_n(&self, view: View) -> usize {
    match view {
      View::Menu => self.menu_top_n,
      View::Command => self.command_top_n,
    }
  }

  /// Longest window the derived metrics ever look at.
  pub fn metrics_lookback_days(&self) -> u32 {
    self.no_win_lookback_days.max(self.answer_streak_lookback_days)
  }

  /// The locale key naming `badge`, from either the rule table or the
  /// placement table.
  pub fn badge_name_key(&self, badge: &BadgeId) -> Option<&str> {
    self
      .badge_rules
      .iter()
      .find(|r| &r.badge == badge)
      .map(|r| r.name_key.as_str())
      .or_else(|| {
        self
          .placement_badges
          .iter()
          .find(|p| &p.badge == badge)
          .map(|p| p.name_key.as_str())
      })
  }
}
