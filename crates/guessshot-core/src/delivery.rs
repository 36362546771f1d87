//! Delivery records: which questions a user has already been shown.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{profile::UserHandle, question::Question};

/// "This question was shown to this user for this topic." Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryRecord {
  pub delivery_id: Uuid,
  pub user:        UserHandle,
  pub question_id: u32,
  pub topic:       String,
  pub sent_at:     DateTime<Utc>,
}

/// Input to [`crate::store::QuizStore::record_delivery`].
#[derive(Debug, Clone)]
pub struct NewDelivery {
  pub user:        UserHandle,
  pub question_id: u32,
  pub topic:       String,
  pub sent_at:     DateTime<Utc>,
}

/// Result of [`crate::engine::delivery::select_next`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "question", rename_all = "snake_case")]
pub enum Selection {
  /// Already recorded as delivered; hand it to the transport.
  Question(Question),
  /// Every catalog question for the topic has been delivered to this user,
  /// or the catalog could not be read.
  Exhausted,
}

/// A selection for a randomly chosen topic (the "play" button).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayRound {
  /// `None` when no topics are configured.
  pub topic:     Option<String>,
  pub selection: Selection,
}
