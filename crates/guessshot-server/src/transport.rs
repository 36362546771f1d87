//! Outbound chat transports.
//!
//! [`WebhookTransport`] posts each message as JSON to a chat gateway, which
//! owns the bot token and the actual chat API. [`LogTransport`] only logs,
//! for running without a gateway.

use std::{sync::Arc, time::Duration};

use guessshot_core::{
  profile::{UserHandle, UserProfile},
  question::Question,
  transport::{ChatTransport, DeliveryFailure, Notice},
};
use reqwest::Client;
use serde::Serialize;
use tracing::info;

use crate::locale::Locales;

/// The JSON body posted to the gateway.
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutboundMessage<'a> {
  Question {
    chat_id:     UserHandle,
    locale:      &'a str,
    topic:       &'a str,
    question_id: u32,
    text:        String,
    options:     &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    image:       Option<&'a str>,
  },
  Notice {
    chat_id: UserHandle,
    locale:  &'a str,
    notice:  Notice,
    text:    String,
  },
}

impl<'a> OutboundMessage<'a> {
  pub fn question(recipient: &'a UserProfile, topic: &'a str, question: &'a Question) -> Self {
    Self::Question {
      chat_id: recipient.handle,
      locale: &recipient.locale,
      topic,
      question_id: question.id,
      text: format!("<b>{}</b>", question.question),
      options: &question.options,
      image: question.image.as_deref(),
    }
  }

  pub fn notice(recipient: &'a UserProfile, notice: Notice, locales: &Locales) -> Self {
    Self::Notice {
      chat_id: recipient.handle,
      locale: &recipient.locale,
      notice,
      text: locales.notice(&recipient.locale, notice),
    }
  }
}

// ─── Webhook ──────────────────────────────────────────────────────────────────

pub struct WebhookTransport {
  client:  Client,
  url:     String,
  locales: Arc<Locales>,
}

impl WebhookTransport {
  pub fn new(url: impl Into<String>, locales: Arc<Locales>) -> reqwest::Result<Self> {
    let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
    Ok(Self { client, url: url.into(), locales })
  }

  async fn post(&self, recipient: UserHandle, message: &OutboundMessage<'_>) -> Result<(), DeliveryFailure> {
    let failure = |reason: String| DeliveryFailure { recipient, reason };

    let resp = self
      .client
      .post(&self.url)
      .json(message)
      .send()
      .await
      .map_err(|e| failure(e.to_string()))?;

    if !resp.status().is_success() {
      return Err(failure(format!("gateway returned {}", resp.status())));
    }
    Ok(())
  }
}

impl ChatTransport for WebhookTransport {
  async fn send_question(
    &self,
    recipient: &UserProfile,
    topic: &str,
    question: &Question,
  ) -> Result<(), DeliveryFailure> {
    let message = OutboundMessage::question(recipient, topic, question);
    self.post(recipient.handle, &message).await
  }

  async fn send_notice(&self, recipient: &UserProfile, notice: Notice) -> Result<(), DeliveryFailure> {
    let message = OutboundMessage::notice(recipient, notice, &self.locales);
    self.post(recipient.handle, &message).await
  }
}

// ─── Log only ─────────────────────────────────────────────────────────────────

pub struct LogTransport {
  locales: Arc<Locales>,
}

impl LogTransport {
  pub fn new(locales: Arc<Locales>) -> Self { Self { locales } }
}

impl ChatTransport for LogTransport {
  async fn send_question(
    &self,
    recipient: &UserProfile,
    topic: &str,
    question: &Question,
  ) -> Result<(), DeliveryFailure> {
    info!(user = %recipient.handle, %topic, question = question.id, "question (not sent)");
    Ok(())
  }

  async fn send_notice(&self, recipient: &UserProfile, notice: Notice) -> Result<(), DeliveryFailure> {
    let text = self.locales.notice(&recipient.locale, notice);
    info!(user = %recipient.handle, %notice, %text, "notice (not sent)");
    Ok(())
  }
}

// ─── Selection ────────────────────────────────────────────────────────────────

/// The transport chosen at startup.
pub enum Transport {
  Webhook(WebhookTransport),
  Log(LogTransport),
}

impl ChatTransport for Transport {
  async fn send_question(
    &self,
    recipient: &UserProfile,
    topic: &str,
    question: &Question,
  ) -> Result<(), DeliveryFailure> {
    match self {
      Self::Webhook(t) => t.send_question(recipient, topic, question).await,
      Self::Log(t) => t.send_question(recipient, topic, question).await,
    }
  }

  async fn send_notice(&self, recipient: &UserProfile, notice: Notice) -> Result<(), DeliveryFailure> {
    match self {
      Self::Webhook(t) => t.send_notice(recipient, notice).await,
      Self::Log(t) => t.send_notice(recipient, notice).await,
    }
  }
}
