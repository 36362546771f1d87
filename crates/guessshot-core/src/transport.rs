//! The outbound chat transport boundary.
//!
//! The core hands the transport plain data; rendering text, keyboards, and
//! images is the transport's job.

use std::future::Future;

use serde::Serialize;
use thiserror::Error;

use crate::{
  profile::{UserHandle, UserProfile},
  question::Question,
};

/// A locale-keyed message with no payload of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Notice {
  /// "A new quiz starts in ten minutes."
  QuizReminder,
}

impl Notice {
  /// The locale key holding this notice's text.
  pub fn locale_key(self) -> &'static str {
    match self {
      Self::QuizReminder => "reminder_msg",
    }
  }
}

/// Sending to one recipient failed. Never aborts a broadcast.
#[derive(Debug, Error)]
#[error("delivery to {recipient} failed: {reason}")]
pub struct DeliveryFailure {
  pub recipient: UserHandle,
  pub reason:    String,
}

pub trait ChatTransport: Send + Sync {
  fn send_question<'a>(
    &'a self,
    recipient: &'a UserProfile,
    topic: &'a str,
    question: &'a Question,
  ) -> impl Future<Output = Result<(), DeliveryFailure>> + Send + 'a;

  fn send_notice<'a>(
    &'a self,
    recipient: &'a UserProfile,
    notice: Notice,
  ) -> impl Future<Output = Result<(), DeliveryFailure>> + Send + 'a;
}
