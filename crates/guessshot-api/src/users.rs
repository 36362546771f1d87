//! Handlers for `/users` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/users/:id/contact` | Body: `{"display_name":"..","payload":"ref_7"}`; 201 on creation |
//! | `GET`  | `/users/:id` | 404 if not registered |
//! | `PUT`  | `/users/:id/locale` | Body: `{"locale":"en"}` |
//! | `GET`  | `/users/:id/stats` | Evaluates achievements first |
//! | `POST` | `/users/:id/play` | Random topic |
//! | `POST` | `/users/:id/next/:topic` | Optional `?locale=`; defaults to the profile's |

use axum::{
  Json,
  extract::{Path, Query, State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::Utc;
use guessshot_core::{
  Error,
  catalog::QuestionCatalog,
  delivery::{PlayRound, Selection},
  engine::{achievements, contact, delivery},
  profile::{UserHandle, UserProfile},
  store::QuizStore,
  transport::ChatTransport,
};
use serde::Deserialize;

use crate::{AppState, auth::Authenticated, error::ApiError};

// ─── Contact ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ContactBody {
  pub display_name: Option<String>,
  pub payload:      Option<String>,
}

/// `POST /users/:id/contact`
pub async fn register<S, C, T>(
  _auth: Authenticated,
  State(state): State<AppState<S, C, T>>,
  Path(id): Path<i64>,
  body: Result<Json<ContactBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: QuizStore + 'static,
  C: QuestionCatalog + 'static,
  T: ChatTransport + 'static,
{
  let Json(body) = body?;
  let registration = contact::register_contact(
    state.ctx(),
    contact::Contact {
      user:         UserHandle(id),
      display_name: body.display_name,
      payload:      body.payload,
    },
  )
  .await?;

  let status = if registration.created { StatusCode::CREATED } else { StatusCode::OK };
  Ok((status, Json(registration)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /users/:id`
pub async fn get_one<S, C, T>(
  _auth: Authenticated,
  State(state): State<AppState<S, C, T>>,
  Path(id): Path<i64>,
) -> Result<Json<UserProfile>, ApiError>
where
  S: QuizStore + 'static,
  C: QuestionCatalog + 'static,
  T: ChatTransport + 'static,
{
  Ok(Json(profile(&state, UserHandle(id)).await?))
}

// ─── Locale ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LocaleBody {
  pub locale: String,
}

/// `PUT /users/:id/locale`
pub async fn locale<S, C, T>(
  _auth: Authenticated,
  State(state): State<AppState<S, C, T>>,
  Path(id): Path<i64>,
  body: Result<Json<LocaleBody>, JsonRejection>,
) -> Result<Json<UserProfile>, ApiError>
where
  S: QuizStore + 'static,
  C: QuestionCatalog + 'static,
  T: ChatTransport + 'static,
{
  let Json(body) = body?;
  let profile = contact::set_locale(state.ctx(), UserHandle(id), &body.locale).await?;
  Ok(Json(profile))
}

// ─── Stats ────────────────────────────────────────────────────────────────────

/// `GET /users/:id/stats`
pub async fn stats<S, C, T>(
  _auth: Authenticated,
  State(state): State<AppState<S, C, T>>,
  Path(id): Path<i64>,
) -> Result<Json<achievements::Stats>, ApiError>
where
  S: QuizStore + 'static,
  C: QuestionCatalog + 'static,
  T: ChatTransport + 'static,
{
  let stats = achievements::stats(state.ctx(), UserHandle(id), Utc::now()).await?;
  Ok(Json(stats))
}

// ─── Play / next ──────────────────────────────────────────────────────────────

/// `POST /users/:id/play`
pub async fn play<S, C, T>(
  _auth: Authenticated,
  State(state): State<AppState<S, C, T>>,
  Path(id): Path<i64>,
) -> Result<Json<PlayRound>, ApiError>
where
  S: QuizStore + 'static,
  C: QuestionCatalog + 'static,
  T: ChatTransport + 'static,
{
  Ok(Json(delivery::play(state.ctx(), UserHandle(id)).await?))
}

#[derive(Debug, Deserialize)]
pub struct NextParams {
  pub locale: Option<String>,
}

/// `POST /users/:id/next/:topic[?locale=<locale>]`
pub async fn next<S, C, T>(
  _auth: Authenticated,
  State(state): State<AppState<S, C, T>>,
  Path((id, topic)): Path<(i64, String)>,
  Query(params): Query<NextParams>,
) -> Result<Json<Selection>, ApiError>
where
  S: QuizStore + 'static,
  C: QuestionCatalog + 'static,
  T: ChatTransport + 'static,
{
  let user = UserHandle(id);
  let profile = profile(&state, user).await?;
  let locale = match params.locale {
    Some(locale) if state.config.supports_locale(&locale) => locale,
    Some(locale) => return Err(Error::UnknownLocale(locale).into()),
    None => profile.locale,
  };

  let selection = delivery::select_next(state.ctx(), user, &topic, &locale).await?;
  Ok(Json(selection))
}

async fn profile<S: QuizStore, C, T>(
  state: &AppState<S, C, T>,
  user: UserHandle,
) -> Result<UserProfile, Error> {
  state
    .store
    .get_profile(user)
    .await
    .map_err(Error::store)?
    .ok_or(Error::ProfileNotFound(user))
}
