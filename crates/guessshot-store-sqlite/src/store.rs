//! [`SqliteStore`], the SQLite implementation of [`QuizStore`].

use std::{collections::HashSet, path::Path};

use chrono::{NaiveDate, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use guessshot_core::{
  answer::{AnswerAttempt, AttemptWrite, DayActivity, NewAttempt},
  badge::BadgeId,
  delivery::{DeliveryRecord, NewDelivery},
  profile::{NewProfile, Registration, UserHandle, UserProfile},
  ranking::{Standing, WindowBounds},
  store::QuizStore,
};

use crate::{
  Result,
  encode::{
    RawProfile, decode_day, decode_dt, decode_uuid, encode_day, encode_dt, encode_uuid,
    read_all_profiles, read_profile,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A quiz store backed by a single SQLite file.
///
/// Clones share the same underlying connection.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Every attempt by `user`, oldest first. Not part of [`QuizStore`];
  /// used by tests and diagnostics.
  pub async fn attempts_for(&self, user: UserHandle) -> Result<Vec<AnswerAttempt>> {
    let raws: Vec<(String, u32, String, bool, String, String)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT attempt_id, question_id, topic, is_correct, answered_at, local_day
           FROM answers WHERE user_id = ?1 ORDER BY answered_at, rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![user.0], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?, row.get(5)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(|(id, question_id, topic, correct, at, day)| {
        Ok(AnswerAttempt {
          attempt_id: decode_uuid(&id)?,
          user,
          question_id,
          topic,
          correct,
          answered_at: decode_dt(&at)?,
          local_day: decode_day(&day)?,
        })
      })
      .collect()
  }
}

// ─── QuizStore impl ──────────────────────────────────────────────────────────

impl QuizStore for SqliteStore {
  type Error = crate::Error;

  // ── Profiles ──────────────────────────────────────────────────────────────

  async fn register(&self, input: NewProfile) -> Result<Registration> {
    let user_id   = input.handle.0;
    let referrer  = input.referrer.map(|r| r.0).filter(|r| *r != user_id);
    let at_str    = encode_dt(Utc::now());

    let (raw, created, credited): (RawProfile, bool, bool) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        if let Some(existing) = read_profile(&tx, user_id)? {
          return Ok((existing, false, false));
        }

        let referrer = match referrer {
          Some(r) => tx
            .query_row(
              "SELECT user_id FROM users WHERE user_id = ?1",
              rusqlite::params![r],
              |row| row.get::<_, i64>(0),
            )
            .optional()?,
          None => None,
        };

        tx.execute(
          "INSERT INTO users (user_id, display_name, locale, utc_offset_minutes, referrer_id, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            user_id,
            input.display_name,
            input.locale,
            input.utc_offset_minutes,
            referrer,
            at_str,
          ],
        )?;

        if let Some(r) = referrer {
          tx.execute(
            "UPDATE users SET referral_count = referral_count + 1 WHERE user_id = ?1",
            rusqlite::params![r],
          )?;
        }

        let raw = read_profile(&tx, user_id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)?;
        tx.commit()?;
        Ok((raw, true, referrer.is_some()))
      })
      .await?;

    Ok(Registration {
      profile:           raw.into_profile()?,
      created,
      referral_credited: credited,
    })
  }

  async fn get_profile(&self, user: UserHandle) -> Result<Option<UserProfile>> {
    let raw: Option<RawProfile> = self
      .conn
      .call(move |conn| Ok(read_profile(conn, user.0)?))
      .await?;

    raw.map(RawProfile::into_profile).transpose()
  }

  async fn list_profiles(&self) -> Result<Vec<UserProfile>> {
    let raws: Vec<RawProfile> = self
      .conn
      .call(|conn| Ok(read_all_profiles(conn)?))
      .await?;

    raws.into_iter().map(RawProfile::into_profile).collect()
  }

  async fn set_locale(&self, user: UserHandle, locale: String) -> Result<Option<UserProfile>> {
    let raw: Option<RawProfile> = self
      .conn
      .call(move |conn| {
        let updated = conn.execute(
          "UPDATE users SET locale = ?2 WHERE user_id = ?1",
          rusqlite::params![user.0, locale],
        )?;
        if updated == 0 {
          return Ok(None);
        }
        Ok(read_profile(conn, user.0)?)
      })
      .await?;

    raw.map(RawProfile::into_profile).transpose()
  }

  // ── Answer ledger ─────────────────────────────────────────────────────────

  async fn record_attempt(&self, input: NewAttempt) -> Result<AttemptWrite> {
    let attempt = AnswerAttempt {
      attempt_id:  Uuid::new_v4(),
      user:        input.user,
      question_id: input.question_id,
      topic:       input.topic,
      correct:     input.correct,
      answered_at: input.answered_at,
      local_day:   input.local_day,
    };

    let id_str  = encode_uuid(attempt.attempt_id);
    let user_id = attempt.user.0;
    let qid     = attempt.question_id;
    let topic   = attempt.topic.clone();
    let correct = attempt.correct;
    let at_str  = encode_dt(attempt.answered_at);
    let day_str = encode_day(attempt.local_day);

    let raw: Option<RawProfile> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let duplicate = tx
          .query_row(
            "SELECT 1 FROM answers
             WHERE user_id = ?1 AND question_id = ?2 AND topic = ?3 AND local_day = ?4",
            rusqlite::params![user_id, qid, topic, day_str],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if duplicate {
          return Ok(None);
        }

        tx.execute(
          "INSERT INTO answers (attempt_id, user_id, question_id, topic, is_correct, answered_at, local_day)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![id_str, user_id, qid, topic, correct, at_str, day_str],
        )?;

        tx.execute(
          "UPDATE users SET
             games_played = games_played + 1,
             score        = score + ?2,
             streak       = CASE WHEN ?3 THEN streak + 1 ELSE 0 END
           WHERE user_id = ?1",
          rusqlite::params![user_id, i64::from(correct), correct],
        )?;

        let raw = read_profile(&tx, user_id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)?;
        tx.commit()?;
        Ok(Some(raw))
      })
      .await?;

    match raw {
      Some(raw) => Ok(AttemptWrite::Recorded { attempt, profile: raw.into_profile()? }),
      None => Ok(AttemptWrite::Duplicate),
    }
  }

  async fn daily_activity(&self, user: UserHandle, since: NaiveDate) -> Result<Vec<DayActivity>> {
    let since_str = encode_day(since);

    let rows: Vec<(String, u32, u32)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT local_day, COUNT(*), SUM(is_correct)
           FROM answers
           WHERE user_id = ?1 AND local_day >= ?2
           GROUP BY local_day",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![user.0, since_str], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    rows
      .into_iter()
      .map(|(day, attempts, correct)| {
        Ok(DayActivity { day: decode_day(&day)?, attempts, correct })
      })
      .collect()
  }

  async fn correct_counts(&self, bounds: WindowBounds) -> Result<Vec<Standing>> {
    let start_str = encode_dt(bounds.start);
    let end_str   = encode_dt(bounds.end);

    let rows: Vec<(i64, Option<String>, u32)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT a.user_id, u.display_name, COUNT(*) AS correct
           FROM answers a
           JOIN users u ON u.user_id = a.user_id
           WHERE a.is_correct = 1
             AND a.answered_at >= ?1
             AND a.answered_at <  ?2
           GROUP BY a.user_id
           ORDER BY correct DESC, a.user_id ASC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![start_str, end_str], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(
      rows
        .into_iter()
        .map(|(user_id, display_name, correct)| Standing {
          user: UserHandle(user_id),
          display_name,
          correct,
        })
        .collect(),
    )
  }

  // ── Badges ────────────────────────────────────────────────────────────────

  async fn award_badges(&self, user: UserHandle, badges: &[BadgeId]) -> Result<Vec<BadgeId>> {
    if badges.is_empty() {
      return Ok(Vec::new());
    }

    let ids: Vec<String> = badges.iter().map(|b| b.0.clone()).collect();
    let at_str = encode_dt(Utc::now());

    let added: Vec<String> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut added = Vec::new();
        {
          let mut stmt = tx.prepare(
            "INSERT OR IGNORE INTO badges (user_id, badge_id, awarded_at) VALUES (?1, ?2, ?3)",
          )?;
          for id in ids {
            if stmt.execute(rusqlite::params![user.0, id, at_str])? == 1 {
              added.push(id);
            }
          }
        }
        tx.commit()?;
        Ok(added)
      })
      .await?;

    Ok(added.into_iter().map(BadgeId).collect())
  }

  // ── Delivery history ──────────────────────────────────────────────────────

  async fn delivered_question_ids(&self, user: UserHandle, topic: &str) -> Result<HashSet<u32>> {
    let topic = topic.to_owned();

    let ids: HashSet<u32> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT question_id FROM deliveries WHERE user_id = ?1 AND topic = ?2",
        )?;
        let ids = stmt
          .query_map(rusqlite::params![user.0, topic], |row| row.get(0))?
          .collect::<rusqlite::Result<HashSet<u32>>>()?;
        Ok(ids)
      })
      .await?;

    Ok(ids)
  }

  async fn record_delivery(&self, input: NewDelivery) -> Result<Option<DeliveryRecord>> {
    let record = DeliveryRecord {
      delivery_id: Uuid::new_v4(),
      user:        input.user,
      question_id: input.question_id,
      topic:       input.topic,
      sent_at:     input.sent_at,
    };

    let id_str  = encode_uuid(record.delivery_id);
    let user_id = record.user.0;
    let qid     = record.question_id;
    let topic   = record.topic.clone();
    let at_str  = encode_dt(record.sent_at);

    let inserted = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "INSERT OR IGNORE INTO deliveries (delivery_id, user_id, question_id, topic, sent_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, user_id, qid, topic, at_str],
        )?;
        Ok(n == 1)
      })
      .await?;

    Ok(inserted.then_some(record))
  }
}
