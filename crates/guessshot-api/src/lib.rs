//! JSON API for GuessShot.
//!
//! Exposes an axum [`Router`] over a [`QuizStore`], a [`QuestionCatalog`]
//! and a [`ChatTransport`]. The chat front end calls the per-user routes;
//! the scheduler (or an operator) calls the broadcast routes. Every route
//! requires HTTP Basic credentials.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = guessshot_api::api_router(state).layer(TraceLayer::new_for_http());
//! ```

pub mod answers;
pub mod auth;
pub mod broadcast;
pub mod error;
pub mod leaderboard;
pub mod users;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use guessshot_core::{
  catalog::QuestionCatalog, config::QuizConfig, engine::Context,
  store::QuizStore, transport::ChatTransport,
};

pub use auth::AuthConfig;
pub use error::ApiError;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct AppState<S, C, T> {
  pub store:     Arc<S>,
  pub catalog:   Arc<C>,
  pub transport: Arc<T>,
  pub config:    Arc<QuizConfig>,
  pub auth:      Arc<AuthConfig>,
}

impl<S, C, T> AppState<S, C, T>
where
  S: QuizStore,
  C: QuestionCatalog,
{
  /// Engine context borrowing this state's store, catalog and config.
  pub fn ctx(&self) -> Context<'_, S, C> {
    Context::new(&self.store, &self.catalog, &self.config)
  }
}

impl<S, C, T> Clone for AppState<S, C, T> {
  fn clone(&self) -> Self {
    Self {
      store:     Arc::clone(&self.store),
      catalog:   Arc::clone(&self.catalog),
      transport: Arc::clone(&self.transport),
      config:    Arc::clone(&self.config),
      auth:      Arc::clone(&self.auth),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the API router for `state`.
pub fn api_router<S, C, T>(state: AppState<S, C, T>) -> Router<()>
where
  S: QuizStore + 'static,
  C: QuestionCatalog + 'static,
  T: ChatTransport + 'static,
{
  Router::new()
    // Users
    .route("/users/{id}", get(users::get_one::<S, C, T>))
    .route("/users/{id}/contact", post(users::register::<S, C, T>))
    .route("/users/{id}/locale", put(users::locale::<S, C, T>))
    .route("/users/{id}/stats", get(users::stats::<S, C, T>))
    .route("/users/{id}/play", post(users::play::<S, C, T>))
    .route("/users/{id}/next/{topic}", post(users::next::<S, C, T>))
    // Answers
    .route("/answers", post(answers::submit::<S, C, T>))
    // Leaderboard
    .route("/leaderboard/{window}", get(leaderboard::handler::<S, C, T>))
    // Broadcasts
    .route("/broadcast/topic/{topic}", post(broadcast::topic::<S, C, T>))
    .route("/broadcast/reminder", post(broadcast::reminder::<S, C, T>))
    .with_state(state)
}

#[cfg(test)]
mod tests;
