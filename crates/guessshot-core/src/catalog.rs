//! The question catalog boundary.

use std::{collections::HashMap, future::Future};

use thiserror::Error;

use crate::question::Question;

/// The questions for a topic/locale pair could not be read.
#[derive(Debug, Clone, Error)]
#[error("catalog unavailable for {topic}/{locale}: {reason}")]
pub struct CatalogUnavailable {
  pub topic:  String,
  pub locale: String,
  pub reason: String,
}

/// Source of question records, keyed by topic and locale.
pub trait QuestionCatalog: Send + Sync {
  fn fetch<'a>(
    &'a self,
    topic: &'a str,
    locale: &'a str,
  ) -> impl Future<Output = Result<Vec<Question>, CatalogUnavailable>> + Send + 'a;
}

/// A fixed in-memory catalog, mostly for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
  entries: HashMap<(String, String), Vec<Question>>,
}

impl MemoryCatalog {
  pub fn new() -> Self { Self::default() }

  pub fn with_topic(
    mut self,
    topic: &str,
    locale: &str,
    questions: Vec<Question>,
  ) -> Self {
    self
      .entries
      .insert((topic.to_owned(), locale.to_owned()), questions);
    self
  }
}

impl QuestionCatalog for MemoryCatalog {
  async fn fetch(
    &self,
    topic: &str,
    locale: &str,
  ) -> Result<Vec<Question>, CatalogUnavailable> {
    self
      .entries
      .get(&(topic.to_owned(), locale.to_owned()))
      .cloned()
      .ok_or_else(|| CatalogUnavailable {
        topic:  topic.to_owned(),
        locale: locale.to_owned(),
        reason: "no such topic".to_owned(),
      })
  }
}
