//! First contact, referral linkage, and language selection.

use serde::Deserialize;
use tracing::info;

use super::Context;
use crate::{
  Error, Result,
  catalog::QuestionCatalog,
  profile::{NewProfile, Registration, UserHandle, UserProfile},
  store::QuizStore,
};

/// An initial contact as received from the transport.
#[derive(Debug, Clone, Deserialize)]
pub struct Contact {
  pub user:         UserHandle,
  pub display_name: Option<String>,
  /// The start payload, e.g. `ref_12345`.
  #[serde(default)]
  pub payload:      Option<String>,
}

/// Parse a `ref_<numeric id>` start payload.
pub fn parse_referral(payload: &str) -> Option<UserHandle> {
  let digits = payload.trim().strip_prefix("ref_")?;
  if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
    return None;
  }
  digits.parse().ok().map(UserHandle)
}

/// Create the profile on first contact; later contacts change nothing.
///
/// A referral credits the referrer only on creation, never for a
/// self-referral, and never for an unknown referrer.
pub async fn register_contact<S, C>(
  ctx: Context<'_, S, C>,
  contact: Contact,
) -> Result<Registration>
where
  S: QuizStore,
  C: QuestionCatalog,
{
  let referrer = contact
    .payload
    .as_deref()
    .and_then(parse_referral)
    .filter(|r| *r != contact.user);

  let registration = ctx
    .store
    .register(NewProfile {
      handle: contact.user,
      display_name: contact.display_name,
      locale: ctx.config.default_locale.clone(),
      utc_offset_minutes: ctx.config.default_user_utc_offset_minutes,
      referrer,
    })
    .await
    .map_err(Error::store)?;

  if registration.created {
    info!(
      user = %contact.user,
      referrer = ?registration.profile.referrer.map(|r| r.0),
      "profile created"
    );
  }
  Ok(registration)
}

pub async fn set_locale<S, C>(
  ctx: Context<'_, S, C>,
  user: UserHandle,
  locale: &str,
) -> Result<UserProfile>
where
  S: QuizStore,
  C: QuestionCatalog,
{
  if !ctx.config.supports_locale(locale) {
    return Err(Error::UnknownLocale(locale.to_owned()));
  }

  ctx
    .store
    .set_locale(user, locale.to_owned())
    .await
    .map_err(Error::store)?
    .ok_or(Error::ProfileNotFound(user))
}
