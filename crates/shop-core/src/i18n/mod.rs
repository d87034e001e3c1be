//! UI message tables keyed by locale.
//!
//! Tables ship inside the binary as TOML documents. Nested tables are
//! flattened into dotted keys, so `[nav] home = ".."` is looked up as
//! `nav.home`.

use crate::config::I18nConfig;
use crate::error::{Result, ShopError};
use std::collections::HashMap;

const ZH_HANT: &str = include_str!("../../locales/zhHant.toml");
const EN: &str = include_str!("../../locales/en.toml");

type Messages = HashMap<String, String>;

#[derive(Debug, Clone)]
pub struct I18n {
    locale: String,
    fallback: String,
    messages: HashMap<String, Messages>,
}

impl I18n {
    /// Builds the catalogue from the bundled locales.
    pub fn bundled(config: &I18nConfig) -> Result<Self> {
        let mut i18n = Self {
            locale: config.fallback.clone(),
            fallback: config.fallback.clone(),
            messages: HashMap::new(),
        };
        i18n.add_locale("zhHant", ZH_HANT)?;
        i18n.add_locale("en", EN)?;

        if !i18n.messages.contains_key(&i18n.fallback) {
            return Err(ShopError::config(format!(
                "unknown fallback locale '{}'",
                i18n.fallback
            )));
        }
        i18n.set_locale(&config.locale)?;
        Ok(i18n)
    }

    /// Parses a TOML message table and registers it under `locale`.
    pub fn add_locale(&mut self, locale: impl Into<String>, source: &str) -> Result<()> {
        let table: toml::Table = toml::from_str(source)?;
        let mut messages = Messages::new();
        flatten("", &table, &mut messages);
        self.messages.insert(locale.into(), messages);
        Ok(())
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn set_locale(&mut self, locale: &str) -> Result<()> {
        if !self.messages.contains_key(locale) {
            return Err(ShopError::config(format!("unknown locale '{locale}'")));
        }
        self.locale = locale.to_string();
        Ok(())
    }

    /// Translates `key`, falling back to the fallback locale and then to the key itself.
    pub fn t(&self, key: &str) -> String {
        [&self.locale, &self.fallback]
            .into_iter()
            .filter_map(|locale| self.messages.get(locale.as_str()))
            .find_map(|messages| messages.get(key))
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}

fn flatten(prefix: &str, table: &toml::Table, out: &mut Messages) {
    for (key, value) in table {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            toml::Value::Table(nested) => flatten(&path, nested, out),
            toml::Value::String(text) => {
                out.insert(path, text.clone());
            }
            other => {
                out.insert(path, other.to_string());
            }
        }
    }
}
