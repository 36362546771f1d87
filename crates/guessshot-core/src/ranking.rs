//! Leaderboard windows and ranked output.

use chrono::{DateTime, Datelike, Days, FixedOffset, Months, Utc};
use serde::{Deserialize, Serialize};

use crate::{badge::BadgeId, calendar, profile::UserHandle};

// ─── Windows ─────────────────────────────────────────────────────────────────

/// A leaderboard time range, anchored to "now" in the reference offset.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Window {
  Day,
  /// Monday through Sunday of the current ISO week.
  Week,
  Month,
}

/// A half-open instant range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowBounds {
  pub start: DateTime<Utc>,
  pub end:   DateTime<Utc>,
}

impl WindowBounds {
  pub fn contains(&self, instant: DateTime<Utc>) -> bool {
    self.start <= instant && instant < self.end
  }
}

impl Window {
  /// The window containing `now`, with day boundaries at local midnight in
  /// `offset`.
  pub fn bounds(self, now: DateTime<Utc>, offset: FixedOffset) -> WindowBounds {
    let today = calendar::local_day(now, offset);
    let (first, next) = match self {
      Self::Day => (today, today + Days::new(1)),
      Self::Week => {
        let back = today.weekday().num_days_from_monday();
        let monday = today - Days::new(u64::from(back));
        (monday, monday + Days::new(7))
      }
      Self::Month => {
        let first = today - Days::new(u64::from(today.day0()));
        (first, first + Months::new(1))
      }
    };
    WindowBounds {
      start: calendar::local_midnight(first, offset),
      end:   calendar::local_midnight(next, offset),
    }
  }
}

/// Which truncation a caller wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
  /// The short list behind the main-menu rating button.
  Menu,
  /// The longer list for explicit day/week/month commands.
  #[default]
  Command,
}

// ─── Output ──────────────────────────────────────────────────────────────────

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
  pub user:         UserHandle,
  pub display_name: Option<String>,
  /// Correct attempts inside the window.
  pub correct:      u32,
}

/// A placement badge newly written by a ranking call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
  pub user:  UserHandle,
  pub rank:  u32,
  pub badge: BadgeId,
}

/// Result of [`crate::engine::leaderboard::rank`].
///
/// `standings` is sorted by `correct` descending, ties broken by ascending
/// user handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Leaderboard {
  Ranked {
    window:    Window,
    bounds:    WindowBounds,
    standings: Vec<Standing>,
    awarded:   Vec<Placement>,
  },
  /// No correct attempts in the window; nothing to display.
  NoActivity {
    window: Window,
    bounds: WindowBounds,
  },
}

impl Leaderboard {
  pub fn standings(&self) -> &[Standing] {
    match self {
      Self::Ranked { standings, .. } => standings,
      Self::NoActivity { .. } => &[],
    }
  }
}
