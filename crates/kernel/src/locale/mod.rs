//! Interface translations.
//!
//! A translation is identified by application, module, language, type and
//! name. Saving one either updates the existing value for that key or adds
//! a new record. Translations live in memory for the lifetime of the process.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Translation types: actions, errors, labels and messages.
pub const TRANSLATION_TYPES: [&str; 4] = ["act", "err", "lbl", "msg"];

/// The only module frontend translations may belong to.
pub const FRONTEND_MODULE: &str = "Core";

/// Which side of the CMS a translation is shown in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Application {
    Backend,
    Frontend,
}

impl Application {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Backend" => Some(Self::Backend),
            "Frontend" => Some(Self::Frontend),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Backend => "Backend",
            Self::Frontend => "Frontend",
        }
    }
}

/// Everything that identifies a translation except its value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TranslationKey {
    pub application: Application,
    pub module: String,
    pub language: String,
    #[serde(rename = "type")]
    pub translation_type: String,
    pub name: String,
}

/// A stored translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Translation {
    pub id: i64,
    #[serde(flatten)]
    pub key: TranslationKey,
    pub value: String,
    pub edited_on: DateTime<Utc>,
}

/// Raw translation fields as posted by the backend.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TranslationInput {
    pub language: String,
    pub module: String,
    pub name: String,
    #[serde(rename = "type")]
    pub translation_type: String,
    pub application: String,
    pub value: String,
}

/// Why a translation was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslationError {
    /// Blank value, or a language, module, type or application that is not allowed.
    #[error("Invalid value.")]
    InvalidValue,

    /// An action translation that would change when used in a URL.
    #[error("The action name contains invalid characters.")]
    InvalidActionValue,
}

/// The languages and modules translations may be saved for.
#[derive(Debug, Clone, Default)]
pub struct LocaleRules {
    pub languages: Vec<String>,
    pub modules: Vec<String>,
}

impl LocaleRules {
    /// Check a posted translation, returning its key and value.
    pub fn validate(
        &self,
        input: TranslationInput,
    ) -> Result<(TranslationKey, String), TranslationError> {
        let language_ok = self.languages.iter().any(|l| *l == input.language);
        let module_ok = self.modules.iter().any(|m| *m == input.module);
        let type_ok = TRANSLATION_TYPES.contains(&input.translation_type.as_str());
        let application = Application::parse(&input.application);

        let application = match application {
            Some(application)
                if language_ok
                    && module_ok
                    && type_ok
                    && !input.value.trim().is_empty()
                    && (application == Application::Backend
                        || input.module == FRONTEND_MODULE) =>
            {
                application
            }
            _ => return Err(TranslationError::InvalidValue),
        };

        if input.translation_type == "act" && !is_url_safe(&input.value) {
            return Err(TranslationError::InvalidActionValue);
        }

        let key = TranslationKey {
            application,
            module: input.module,
            language: input.language,
            translation_type: input.translation_type,
            name: input.name,
        };
        Ok((key, input.value))
    }
}

/// Whether `value` survives URL encoding and slug normalisation unchanged.
pub fn is_url_safe(value: &str) -> bool {
    urlencoding::encode(value) == url_slug(value)
}

/// Lower-case `value`, collapsing every run of other characters into one dash.
pub fn url_slug(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    for c in value.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

/// Thread-safe translation storage keyed by [`TranslationKey`].
#[derive(Debug, Default)]
pub struct TranslationStore {
    inner: RwLock<StoreInner>,
}

#[derive(Debug, Default)]
struct StoreInner {
    translations: BTreeMap<TranslationKey, Translation>,
    last_id: i64,
}

impl TranslationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a translation by key.
    pub fn get(&self, key: &TranslationKey) -> Option<Translation> {
        self.inner.read().translations.get(key).cloned()
    }

    /// Update the value stored under `key`, or add it.
    ///
    /// Returns the stored translation and whether it was newly created.
    pub fn save(&self, key: TranslationKey, value: impl Into<String>) -> (Translation, bool) {
        let mut inner = self.inner.write();
        let value = value.into();
        let edited_on = Utc::now();

        if let Some(existing) = inner.translations.get_mut(&key) {
            existing.value = value;
            existing.edited_on = edited_on;
            debug!(id = existing.id, name = %existing.key.name, "translation updated");
            return (existing.clone(), false);
        }

        inner.last_id += 1;
        let translation = Translation {
            id: inner.last_id,
            key: key.clone(),
            value,
            edited_on,
        };
        debug!(id = translation.id, name = %key.name, "translation inserted");
        inner.translations.insert(key, translation.clone());
        (translation, true)
    }

    /// All translations ordered by key.
    pub fn list(&self) -> Vec<Translation> {
        self.inner.read().translations.values().cloned().collect()
    }
}
