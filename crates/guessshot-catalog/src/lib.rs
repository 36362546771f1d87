//! File-backed question catalog for GuessShot.
//!
//! Each `(topic, locale)` pair lives in its own JSON array at
//! `{dir}/{topic}_{locale}.json`. Files are re-read on every fetch, so
//! edits made while the server runs are picked up by the next delivery.

pub mod error;
mod validate;

use std::path::{Path, PathBuf};

pub use error::{Error, Result};
use guessshot_core::{
  catalog::{CatalogUnavailable, QuestionCatalog},
  question::Question,
};
use tracing::warn;

pub use validate::validate;

/// Reads question files from a directory.
#[derive(Debug, Clone)]
pub struct FileCatalog {
  dir: PathBuf,
}

impl FileCatalog {
  pub fn new(dir: impl Into<PathBuf>) -> Self { Self { dir: dir.into() } }

  pub fn dir(&self) -> &Path { &self.dir }

  /// Path of the file holding `(topic, locale)`.
  ///
  /// Keys are restricted to ASCII alphanumerics plus `-` so a request can
  /// never name a file outside the catalog directory.
  pub fn path_for(&self, topic: &str, locale: &str) -> Result<PathBuf> {
    for key in [topic, locale] {
      let valid = !key.is_empty()
        && key.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-');
      if !valid {
        return Err(Error::InvalidKey(key.to_owned()));
      }
    }
    Ok(self.dir.join(format!("{topic}_{locale}.json")))
  }

  /// Read, parse and validate the questions for `(topic, locale)`.
  pub async fn load(&self, topic: &str, locale: &str) -> Result<Vec<Question>> {
    let path = self.path_for(topic, locale)?;
    let bytes = tokio::fs::read(&path)
      .await
      .map_err(|source| Error::Read { path: path.clone(), source })?;
    let questions: Vec<Question> = serde_json::from_slice(&bytes)
      .map_err(|source| Error::Json { path, source })?;
    validate(&questions)?;
    Ok(questions)
  }
}

impl QuestionCatalog for FileCatalog {
  async fn fetch(
    &self,
    topic: &str,
    locale: &str,
  ) -> Result<Vec<Question>, CatalogUnavailable> {
    self.load(topic, locale).await.map_err(|e| {
      warn!(%topic, %locale, error = %e, "question file unusable");
      CatalogUnavailable {
        topic:  topic.to_owned(),
        locale: locale.to_owned(),
        reason: e.to_string(),
      }
    })
  }
}
