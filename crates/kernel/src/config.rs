//! Configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};

use crate::form::DatePickerSettings;
use crate::locale::LocaleRules;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 3000).
    pub port: u16,

    /// Path to templates directory (default: ./templates).
    pub templates_dir: PathBuf,

    /// Directory holding generated frontend cache files (default: ./src/Frontend/Cache).
    pub frontend_cache_path: PathBuf,

    /// Language content is edited in (default: en).
    pub working_language: String,

    /// Date display mask in PHP-style notation (default: d/m/Y).
    pub date_mask: String,

    /// First day of the week for date pickers, 0 = Sunday (default: 1).
    pub date_first_day: u8,

    /// Version appended to backend script URLs (default: crate version).
    pub asset_version: String,

    /// Send the session cookie over HTTPS only (default: true).
    pub cookie_secure: bool,

    /// JSON file the synonym store is seeded from (optional).
    pub synonyms_file: Option<PathBuf>,

    /// Languages translations may be saved for (default: the working language).
    pub languages: Vec<String>,

    /// Modules translations may be saved for (default: Core,Locale,Search).
    pub modules: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let templates_dir = env::var("TEMPLATES_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./templates"));

        let frontend_cache_path = env::var("FRONTEND_CACHE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./src/Frontend/Cache"));

        let working_language = env::var("WORKING_LANGUAGE")
            .unwrap_or_else(|_| "en".to_string())
            .to_lowercase();

        let date_mask = env::var("DATE_MASK").unwrap_or_else(|_| "d/m/Y".to_string());

        let date_first_day: u8 = env::var("DATE_FIRST_DAY")
            .unwrap_or_else(|_| "1".to_string())
            .parse()
            .context("DATE_FIRST_DAY must be a number from 0 to 6")?;
        if date_first_day > 6 {
            bail!("DATE_FIRST_DAY must be a number from 0 to 6, got {date_first_day}");
        }

        let asset_version =
            env::var("ASSET_VERSION").unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string());

        let cookie_secure = env::var("COOKIE_SECURE")
            .map(|v| !matches!(v.to_lowercase().as_str(), "0" | "false" | "no"))
            .unwrap_or(true);

        let synonyms_file = env::var("SYNONYMS_FILE").ok().map(PathBuf::from);

        let mut languages = list_var("LANGUAGES", &working_language);
        if !languages.contains(&working_language) {
            languages.push(working_language.clone());
        }
        let modules = list_var("MODULES", "Core,Locale,Search");

        Ok(Self {
            port,
            templates_dir,
            frontend_cache_path,
            working_language,
            date_mask,
            date_first_day,
            asset_version,
            cookie_secure,
            synonyms_file,
            languages,
            modules,
        })
    }

    /// Date-picker settings derived from the date configuration.
    pub fn date_picker(&self) -> DatePickerSettings {
        DatePickerSettings {
            mask: self.date_mask.clone(),
            first_day: self.date_first_day,
        }
    }

    /// Languages and modules translations may be saved for.
    pub fn locale_rules(&self) -> LocaleRules {
        LocaleRules {
            languages: self.languages.clone(),
            modules: self.modules.clone(),
        }
    }
}

/// Comma-separated environment variable, trimmed, without empty entries.
fn list_var(name: &str, default: &str) -> Vec<String> {
    split_list(&env::var(name).unwrap_or_else(|_| default.to_string()))
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
