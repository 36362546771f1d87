//! Engines: stateless operations over a [`QuizStore`] and a
//! [`QuestionCatalog`].
//!
//! No engine keeps state between calls. Everything an operation needs is
//! passed in through [`Context`].

pub mod achievements;
pub mod broadcast;
pub mod contact;
pub mod delivery;
pub mod leaderboard;
pub mod metrics;
pub mod scoring;

use crate::{catalog::QuestionCatalog, config::QuizConfig, store::QuizStore};

/// The collaborators and configuration for one engine call.
pub struct Context<'a, S, C> {
  pub store:   &'a S,
  pub catalog: &'a C,
  pub config:  &'a QuizConfig,
}

impl<'a, S, C> Context<'a, S, C>
where
  S: QuizStore,
  C: QuestionCatalog,
{
  pub fn new(store: &'a S, catalog: &'a C, config: &'a QuizConfig) -> Self {
    Self { store, catalog, config }
  }
}

impl<S, C> Clone for Context<'_, S, C> {
  fn clone(&self) -> Self { *self }
}

impl<S, C> Copy for Context<'_, S, C> {}
