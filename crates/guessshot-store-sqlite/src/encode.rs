//! Encoding and decoding helpers between domain types and the plain
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings (microsecond
//! precision, `Z` suffix) so that string comparison orders them correctly.
//! Calendar days are stored as `YYYY-MM-DD`. UUIDs are stored hyphenated.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use guessshot_core::{
  badge::BadgeId,
  profile::{UserHandle, UserProfile},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_day(day: NaiveDate) -> String { day.format("%Y-%m-%d").to_string() }

pub fn decode_day(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawProfile::from_row`].
pub const PROFILE_COLUMNS: &str = "user_id, display_name, locale, utc_offset_minutes, \
   score, streak, games_played, referrer_id, referral_count, created_at";

/// Raw values read directly from a `users` row, plus its badges.
pub struct RawProfile {
  pub user_id:            i64,
  pub display_name:       Option<String>,
  pub locale:             String,
  pub utc_offset_minutes: i32,
  pub score:              u32,
  pub streak:             u32,
  pub games_played:       u32,
  pub referrer_id:        Option<i64>,
  pub referral_count:     u32,
  pub created_at:         String,
  pub badges:             Vec<String>,
}

impl RawProfile {
  /// Read the [`PROFILE_COLUMNS`] of `row`; badges are filled in later.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:            row.get(0)?,
      display_name:       row.get(1)?,
      locale:             row.get(2)?,
      utc_offset_minutes: row.get(3)?,
      score:              row.get(4)?,
      streak:             row.get(5)?,
      games_played:       row.get(6)?,
      referrer_id:        row.get(7)?,
      referral_count:     row.get(8)?,
      created_at:         row.get(9)?,
      badges:             Vec::new(),
    })
  }

  pub fn into_profile(self) -> Result<UserProfile> {
    Ok(UserProfile {
      handle:             UserHandle(self.user_id),
      display_name:       self.display_name,
      locale:             self.locale,
      utc_offset_minutes: self.utc_offset_minutes,
      score:              self.score,
      streak:             self.streak,
      games_played:       self.games_played,
      badges:             self.badges.into_iter().map(BadgeId).collect(),
      referrer:           self.referrer_id.map(UserHandle),
      referral_count:     self.referral_count,
      created_at:         decode_dt(&self.created_at)?,
    })
  }
}

/// Read one profile and its badges. Works on a plain connection or inside a
/// transaction.
pub fn read_profile(
  conn: &rusqlite::Connection,
  user_id: i64,
) -> rusqlite::Result<Option<RawProfile>> {
  use rusqlite::OptionalExtension as _;

  let sql = format!("SELECT {PROFILE_COLUMNS} FROM users WHERE user_id = ?1");
  let Some(mut raw) = conn
    .query_row(&sql, rusqlite::params![user_id], RawProfile::from_row)
    .optional()?
  else {
    return Ok(None);
  };

  let mut stmt = conn.prepare(
    "SELECT badge_id FROM badges WHERE user_id = ?1 ORDER BY awarded_at, rowid",
  )?;
  raw.badges = stmt
    .query_map(rusqlite::params![user_id], |row| row.get(0))?
    .collect::<rusqlite::Result<Vec<String>>>()?;

  Ok(Some(raw))
}

/// Read every profile with its badges, ordered by handle.
pub fn read_all_profiles(conn: &rusqlite::Connection) -> rusqlite::Result<Vec<RawProfile>> {
  let mut badges: HashMap<i64, Vec<String>> = HashMap::new();
  let mut stmt =
    conn.prepare("SELECT user_id, badge_id FROM badges ORDER BY awarded_at, rowid")?;
  let rows = stmt.query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?;
  for row in rows {
    let (user_id, badge) = row?;
    badges.entry(user_id).or_default().push(badge);
  }

  let sql = format!("SELECT {PROFILE_COLUMNS} FROM users ORDER BY user_id");
  let mut stmt = conn.prepare(&sql)?;
  let profiles = stmt
    .query_map([], RawProfile::from_row)?
    .map(|raw| {
      raw.map(|mut raw| {
        raw.badges = badges.remove(&raw.user_id).unwrap_or_default();
        raw
      })
    })
    .collect::<rusqlite::Result<Vec<_>>>()?;

  Ok(profiles)
}
