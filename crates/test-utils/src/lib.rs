//! Atrium test utilities.
//!
//! Helpers for integration testing: timestamps, form-encoded bodies,
//! scraping rendered forms, and temporary frontend cache directories.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use regex::Regex;
use tempfile::TempDir;

/// Unix timestamp of midnight UTC on the given day.
///
/// Returns 0 for a date that does not exist.
pub fn timestamp(year: i32, month: u32, day: u32) -> i64 {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc().timestamp())
        .unwrap_or(0)
}

/// Encode pairs as an `application/x-www-form-urlencoded` body.
pub fn encoded_body(pairs: &[(&str, &str)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

/// Owned name/value pairs, as a decoded request body.
pub fn pairs(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// The `name=value` part of a `Set-Cookie` header, usable as a `Cookie` header.
pub fn cookie_pair(set_cookie: &str) -> String {
    set_cookie
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// The `value` attribute of the input named `name` in rendered HTML.
pub fn input_value(html: &str, name: &str) -> Option<String> {
    let pattern = format!(r#"name="{}"\s+value="([^"]*)""#, regex::escape(name));
    let re = Regex::new(&pattern).ok()?;
    re.captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// The `action` attribute of the first `<form>` tag in rendered HTML, unescaped.
pub fn form_action(html: &str) -> Option<String> {
    let re = Regex::new(r#"<form\b[^>]*\baction="([^"]*)""#).ok()?;
    re.captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().replace("&amp;", "&"))
}

/// A temporary frontend cache directory, removed on drop.
#[derive(Debug)]
pub struct FrontendCache {
    dir: TempDir,
}

impl FrontendCache {
    /// Create an empty cache directory.
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    /// Root of the cache.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write the editor link list for `language`, returning its path.
    pub fn write_link_list(&self, language: &str) -> io::Result<PathBuf> {
        let navigation = self.dir.path().join("Navigation");
        fs::create_dir_all(&navigation)?;
        let path = navigation.join(format!("editor_link_list_{language}.js"));
        fs::write(&path, "var linkList = [];\n")?;
        Ok(path)
    }
}

/// Fixtures for the synonym store.
pub mod synonyms {
    use serde_json::{Value, json};

    /// A seed file body with two synonyms.
    pub fn seed() -> Value {
        json!([
            {"term": "cms", "synonym": "content management, site builder"},
            {"term": "blog", "synonym": "weblog"}
        ])
    }
}

/// Assertion helpers for rendered output.
pub mod assert {
    /// Assert that a string contains a substring.
    pub fn contains(haystack: &str, needle: &str) {
        assert!(
            haystack.contains(needle),
            "Expected string to contain '{needle}'\nActual: {haystack}"
        );
    }

    /// Assert that a string does not contain a substring.
    pub fn not_contains(haystack: &str, needle: &str) {
        assert!(
            !haystack.contains(needle),
            "Expected string to NOT contain '{needle}'\nActual: {haystack}"
        );
    }
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp() {
        assert_eq!(timestamp(2024, 1, 1), 1_704_067_200);
        assert_eq!(timestamp(2024, 2, 30), 0);
    }

    #[test]
    fn test_encoded_body() {
        assert_eq!(
            encoded_body(&[("term", "a b"), ("langs[]", "nl")]),
            "term=a+b&langs%5B%5D=nl"
        );
    }

    #[test]
    fn test_cookie_pair() {
        assert_eq!(
            cookie_pair("id=abc123; HttpOnly; SameSite=Strict; Path=/"),
            "id=abc123"
        );
    }

    #[test]
    fn test_input_value() {
        let html = r#"<input type="hidden" id="formToken" name="form_token" value="tok" />"#;
        assert_eq!(input_value(html, "form_token").as_deref(), Some("tok"));
        assert_eq!(input_value(html, "form"), None);
    }

    #[test]
    fn test_form_action() {
        let html = r#"<form accept-charset="UTF-8" action="/backend/pages?id=1&amp;tab=2" method="post">"#;
        assert_eq!(form_action(html).as_deref(), Some("/backend/pages?id=1&tab=2"));
        assert_eq!(form_action(r#"<input name="action" value="x" />"#), None);
    }

    #[test]
    fn test_frontend_cache() {
        let cache = FrontendCache::new().unwrap();
        let path = cache.write_link_list("nl").unwrap();
        assert!(path.starts_with(cache.path()));
        assert!(path.ends_with("Navigation/editor_link_list_nl.js"));
        assert!(path.is_file());
    }

    #[test]
    fn test_assertions() {
        assert::contains("hello world", "world");
        assert::not_contains("hello world", "foo");
    }

    #[test]
    fn test_synonym_seed() {
        assert_eq!(synonyms::seed().as_array().unwrap().len(), 2);
    }
}
