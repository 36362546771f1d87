//! Per-language message tables loaded from `{locales_dir}/{lang}.json`.

use std::{collections::HashMap, path::Path};

use guessshot_core::transport::Notice;
use serde_json::Value;
use tracing::error;

/// Message tables for every configured locale.
///
/// A locale whose file is missing or malformed gets an empty table, and
/// lookups in it fall back to the default locale.
#[derive(Debug, Clone, Default)]
pub struct Locales {
  default: String,
  tables:  HashMap<String, HashMap<String, String>>,
}

impl Locales {
  pub async fn load(dir: &Path, locales: &[String], default: &str) -> Self {
    let mut tables = HashMap::with_capacity(locales.len());
    for lang in locales {
      let path = dir.join(format!("{lang}.json"));
      let table = match read_table(&path).await {
        Ok(table) => table,
        Err(e) => {
          error!(%lang, path = %path.display(), error = %e, "failed to load locale");
          HashMap::new()
        }
      };
      tables.insert(lang.clone(), table);
    }
    Self { default: default.to_owned(), tables }
  }

  pub fn from_tables(
    default: &str,
    tables: HashMap<String, HashMap<String, String>>,
  ) -> Self {
    Self { default: default.to_owned(), tables }
  }

  /// Look `key` up in `locale`, then in the default locale.
  pub fn text(&self, locale: &str, key: &str) -> Option<&str> {
    [locale, self.default.as_str()]
      .into_iter()
      .find_map(|lang| self.tables.get(lang)?.get(key))
      .map(String::as_str)
  }

  pub fn notice(&self, locale: &str, notice: Notice) -> String {
    let fallback = match notice {
      Notice::QuizReminder => "🎯 Через 10 минут новая викторина! Не пропусти!",
    };
    self
      .text(locale, notice.locale_key())
      .unwrap_or(fallback)
      .to_owned()
  }
}

async fn read_table(path: &Path) -> Result<HashMap<String, String>, String> {
  let bytes = tokio::fs::read(path).await.map_err(|e| e.to_string())?;
  let raw: HashMap<String, Value> =
    serde_json::from_slice(&bytes).map_err(|e| e.to_string())?;
  Ok(
    raw
      .into_iter()
      .filter_map(|(k, v)| match v {
        Value::String(s) => Some((k, s)),
        _ => None,
      })
      .collect(),
  )
}
