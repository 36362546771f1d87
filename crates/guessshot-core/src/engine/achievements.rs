//! The achievement engine: interpret the badge rule table.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use super::{
  Context,
  metrics::{self, DerivedMetrics},
};
use crate::{
  Error, Result,
  badge::{BadgeId, BadgeRule},
  catalog::QuestionCatalog,
  profile::{UserHandle, UserProfile},
  store::QuizStore,
};

/// Result of [`evaluate`].
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
  /// The profile after any new badges were written.
  pub profile:  UserProfile,
  pub metrics:  DerivedMetrics,
  /// Badges added by this call, in rule-table order.
  pub unlocked: Vec<BadgeId>,
}

/// A badge with the locale key for its display name.
#[derive(Debug, Clone, Serialize)]
pub struct BadgeView {
  pub badge:    BadgeId,
  pub name_key: Option<String>,
}

/// The personal statistics screen.
#[derive(Debug, Clone, Serialize)]
pub struct Stats {
  pub profile:  UserProfile,
  pub losses:   u32,
  pub metrics:  DerivedMetrics,
  pub badges:   Vec<BadgeView>,
  pub unlocked: Vec<BadgeId>,
}

/// Badges from `rules` that `profile` lacks and now qualifies for, in table
/// order and without repeats.
pub fn pending_badges(
  rules: &[BadgeRule],
  profile: &UserProfile,
  metrics: &DerivedMetrics,
) -> Vec<BadgeId> {
  let mut pending: Vec<BadgeId> = Vec::new();
  for rule in rules {
    if profile.has_badge(&rule.badge) || pending.contains(&rule.badge) {
      continue;
    }
    if rule.is_met(profile, metrics) {
      pending.push(rule.badge.clone());
    }
  }
  pending
}

/// Unlock every badge whose rule now holds for `user`.
///
/// Writes once if anything qualifies and not at all otherwise, so running
/// it again on an unchanged profile is a no-op.
pub async fn evaluate<S, C>(
  ctx: Context<'_, S, C>,
  user: UserHandle,
  now: DateTime<Utc>,
) -> Result<Evaluation>
where
  S: QuizStore,
  C: QuestionCatalog,
{
  let profile = load(ctx.store, user).await?;
  let metrics = metrics::derive(ctx.store, ctx.config, &profile, now).await?;
  let pending = pending_badges(&ctx.config.badge_rules, &profile, &metrics);

  if pending.is_empty() {
    return Ok(Evaluation { profile, metrics, unlocked: Vec::new() });
  }

  let unlocked = ctx
    .store
    .award_badges(user, &pending)
    .await
    .map_err(Error::store)?;

  for badge in &unlocked {
    info!(%user, %badge, "badge unlocked");
  }

  let profile = load(ctx.store, user).await?;
  Ok(Evaluation { profile, metrics, unlocked })
}

/// Evaluate achievements, then assemble the statistics screen.
pub async fn stats<S, C>(
  ctx: Context<'_, S, C>,
  user: UserHandle,
  now: DateTime<Utc>,
) -> Result<Stats>
where
  S: QuizStore,
  C: QuestionCatalog,
{
  let Evaluation { profile, metrics, unlocked } = evaluate(ctx, user, now).await?;

  let badges = profile
    .badges
    .iter()
    .map(|badge| BadgeView {
      badge:    badge.clone(),
      name_key: ctx.config.badge_name_key(badge).map(str::to_owned),
    })
    .collect();

  Ok(Stats { losses: profile.losses(), profile, metrics, badges, unlocked })
}

async fn load<S: QuizStore>(store: &S, user: UserHandle) -> Result<UserProfile> {
  store
    .get_profile(user)
    .await
    .map_err(Error::store)?
    .ok_or(Error::ProfileNotFound(user))
}
