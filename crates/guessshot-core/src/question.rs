//! Question records as they appear in the catalog files.

use serde::{Deserialize, Serialize};

/// One multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
  pub id:       u32,
  pub question: String,
  /// Exactly the strings accepted as choices, in display order.
  pub options:  Vec<String>,
  /// The canonical correct option; always one of `options`.
  pub answer:   String,
  /// Image file relative to the catalog image directory. `None` means the
  /// question is delivered as text only.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub image:    Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub fact:     Option<String>,
}

impl Question {
  pub fn accepts(&self, option: &str) -> bool {
    self.options.iter().any(|o| o == option)
  }

  pub fn is_correct(&self, option: &str) -> bool { self.answer == option }
}
