//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::Config;
use crate::locale::TranslationStore;
use crate::search::SynonymStore;
use crate::theme::ThemeEngine;

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Loaded configuration.
    config: Config,

    /// Theme engine for template rendering.
    theme: ThemeEngine,

    /// Search synonyms edited through the backend.
    synonyms: SynonymStore,

    /// Interface translations saved through the backend.
    translations: TranslationStore,
}

impl AppState {
    /// Create application state, loading templates from the configured directory.
    pub fn new(config: &Config) -> Result<Self> {
        let theme = ThemeEngine::new(&config.templates_dir)
            .context("failed to load templates")?;
        info!(templates = %config.templates_dir.display(), "theme engine ready");

        let synonyms = match &config.synonyms_file {
            Some(path) => SynonymStore::load(path)?,
            None => SynonymStore::new(),
        };
        info!(count = synonyms.list().len(), "synonyms loaded");

        Ok(Self::from_parts(config.clone(), theme, synonyms))
    }

    /// Assemble state from already-built parts, with no translations yet.
    pub fn from_parts(config: Config, theme: ThemeEngine, synonyms: SynonymStore) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                theme,
                synonyms,
                translations: TranslationStore::new(),
            }),
        }
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn theme(&self) -> &ThemeEngine {
        &self.inner.theme
    }

    pub fn synonyms(&self) -> &SynonymStore {
        &self.inner.synonyms
    }

    pub fn translations(&self) -> &TranslationStore {
        &self.inner.translations
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("port", &self.inner.config.port)
            .field("synonyms", &self.inner.synonyms.list().len())
            .finish()
    }
}
