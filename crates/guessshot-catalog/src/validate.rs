use std::collections::HashSet;

use guessshot_core::question::Question;

use crate::{Error, Result};

/// Check the invariants every catalog file must hold: ids are unique and
/// each answer is one of a non-empty option list.
pub fn validate(questions: &[Question]) -> Result<()> {
  let mut seen = HashSet::with_capacity(questions.len());
  for q in questions {
    if !seen.insert(q.id) {
      return Err(Error::DuplicateId(q.id));
    }
    if q.options.is_empty() {
      return Err(Error::NoOptions { id: q.id });
    }
    if !q.accepts(&q.answer) {
      return Err(Error::AnswerNotAnOption { id: q.id, answer: q.answer.clone() });
    }
  }
  Ok(())
}
