//! Error types for the file-backed question catalog.

use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("cannot read {path}: {source}")]
  Read {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("malformed question file {path}: {source}")]
  Json {
    path:   PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("question {id} has no options")]
  NoOptions { id: u32 },

  #[error("question {id}: answer {answer:?} is not one of its options")]
  AnswerNotAnOption { id: u32, answer: String },

  #[error("question id {0} appears more than once")]
  DuplicateId(u32),

  #[error("invalid catalog key {0:?}")]
  InvalidKey(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
