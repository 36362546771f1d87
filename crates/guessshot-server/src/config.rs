//! Server configuration, deserialised from `config.toml` and `GUESSSHOT_*`
//! environment variables.

use std::path::{Path, PathBuf};

use chrono::NaiveTime;
use guessshot_core::config::QuizConfig;
use serde::{Deserialize, Deserializer, de};

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:               String,
  #[serde(default = "default_port")]
  pub port:               u16,
  pub store_path:         PathBuf,
  /// Directory holding `{topic}_{locale}.json` question files.
  #[serde(default = "default_catalog_dir")]
  pub catalog_dir:        PathBuf,
  /// Directory holding `{locale}.json` message tables.
  #[serde(default = "default_locales_dir")]
  pub locales_dir:        PathBuf,
  pub auth_username:      String,
  pub auth_password_hash: String,
  /// Chat gateway endpoint. Without one, outbound messages are only logged.
  #[serde(default)]
  pub webhook_url:        Option<String>,
  #[serde(default = "default_schedule")]
  pub schedule:           Vec<ScheduleEntry>,
  #[serde(default)]
  pub quiz:               QuizConfig,
}

/// One daily job, fired at `at` in the reference offset.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScheduleEntry {
  #[serde(deserialize_with = "hh_mm")]
  pub at:  NaiveTime,
  pub job: Job,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Job {
  /// `job = "reminder"`
  Reminder,
  /// `job = { topic = "movies" }`
  Topic(String),
}

impl ScheduleEntry {
  fn daily(hour: u32, minute: u32, job: Job) -> Self {
    Self {
      at: NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN),
      job,
    }
  }
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 8080 }

fn default_catalog_dir() -> PathBuf { PathBuf::from("data") }

fn default_locales_dir() -> PathBuf { PathBuf::from("locales") }

/// Reminder ten minutes before each topic broadcast.
pub fn default_schedule() -> Vec<ScheduleEntry> {
  vec![
    ScheduleEntry::daily(11, 50, Job::Reminder),
    ScheduleEntry::daily(12, 0, Job::Topic("movies".into())),
    ScheduleEntry::daily(17, 50, Job::Reminder),
    ScheduleEntry::daily(18, 0, Job::Topic("cities".into())),
  ]
}

fn hh_mm<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
  let s = String::deserialize(d)?;
  NaiveTime::parse_from_str(&s, "%H:%M")
    .map_err(|e| de::Error::custom(format!("invalid time {s:?}: {e}")))
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
