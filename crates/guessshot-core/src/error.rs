//! Error types for `guessshot-core`.
//!
//! Only conditions the caller must refuse are errors. An exhausted topic and
//! an empty leaderboard are ordinary outcomes; see
//! [`crate::delivery::Selection`] and [`crate::ranking::Leaderboard`].

use thiserror::Error;

use crate::profile::UserHandle;

#[derive(Debug, Error)]
pub enum Error {
  #[error("question {question_id} in {topic} was already answered today")]
  AlreadyAnswered { question_id: u32, topic: String },

  #[error("no question {question_id} in {topic} accepts that answer")]
  QuestionNotFound { question_id: u32, topic: String },

  #[error("profile not found: {0}")]
  ProfileNotFound(UserHandle),

  #[error("unknown locale: {0:?}")]
  UnknownLocale(String),

  #[error("unknown topic: {0:?}")]
  UnknownTopic(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Box a backend error.
  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
