//! HTTP Basic-auth extractor for the operator account.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  extract::FromRequestParts,
  http::{header, request::Parts},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use guessshot_core::{
  catalog::QuestionCatalog, store::QuizStore, transport::ChatTransport,
};

use crate::{AppState, error::ApiError};

/// The single operator account allowed to call the API.
#[derive(Clone)]
pub struct AuthConfig {
  pub username:      String,
  /// PHC string produced by `guessshot --hash-password`.
  pub password_hash: String,
}

impl AuthConfig {
  /// A malformed stored hash rejects every password.
  fn accepts(&self, username: &str, password: &str) -> bool {
    if username != self.username {
      return false;
    }
    PasswordHash::new(&self.password_hash).is_ok_and(|hash| {
      Argon2::default()
        .verify_password(password.as_bytes(), &hash)
        .is_ok()
    })
  }
}

/// Present in a handler's arguments means the gateway authenticated.
pub struct Authenticated;

/// Decode a `Basic` header value into `(username, password)`.
fn basic_credentials(value: &str) -> Option<(String, String)> {
  let decoded = B64.decode(value.strip_prefix("Basic ")?).ok()?;
  let text = String::from_utf8(decoded).ok()?;
  let (username, password) = text.split_once(':')?;
  Some((username.to_owned(), password.to_owned()))
}

impl<S, C, T> FromRequestParts<AppState<S, C, T>> for Authenticated
where
  S: QuizStore + 'static,
  C: QuestionCatalog + 'static,
  T: ChatTransport + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, C, T>,
  ) -> Result<Self, Self::Rejection> {
    let (username, password) = parts
      .headers
      .get(header::AUTHORIZATION)
      .and_then(|v| v.to_str().ok())
      .and_then(basic_credentials)
      .ok_or(ApiError::Unauthorized)?;

    if state.auth.accepts(&username, &password) {
      Ok(Authenticated)
    } else {
      Err(ApiError::Unauthorized)
    }
  }
}
