//! Calendar-day arithmetic in fixed UTC offsets.

use chrono::{
  DateTime, FixedOffset, NaiveDate, NaiveTime, Offset, TimeDelta, TimeZone,
  Utc,
};

/// Largest offset magnitude accepted by [`FixedOffset`], in minutes.
const MAX_OFFSET_MINUTES: i32 = 24 * 60 - 1;

/// Build an offset from minutes east of UTC, clamped to the valid range.
pub fn offset_from_minutes(minutes: i32) -> FixedOffset {
  let clamped = minutes.clamp(-MAX_OFFSET_MINUTES, MAX_OFFSET_MINUTES);
  FixedOffset::east_opt(clamped * 60).unwrap_or_else(|| Utc.fix())
}

/// The calendar day `instant` falls on as seen from `offset`.
pub fn local_day(instant: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
  instant.with_timezone(&offset).date_naive()
}

/// The UTC instant of local midnight at the start of `day`.
pub fn local_midnight(day: NaiveDate, offset: FixedOffset) -> DateTime<Utc> {
  let local = day.and_time(NaiveTime::MIN);
  let shift = TimeDelta::seconds(i64::from(offset.local_minus_utc()));
  Utc.from_utc_datetime(&(local - shift))
}
