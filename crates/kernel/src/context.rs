//! Per-request context handed to the form layer.
//!
//! Everything a form needs to know about the current request (route, query,
//! submitted data, working language, session token) is collected here once
//! and passed in explicitly; forms never read ambient state.

use std::path::{Path, PathBuf};

use crate::form::{DatePickerSettings, FormMethod};

/// Immutable view of the request a form is built for.
#[derive(Debug, Clone)]
pub struct RequestContext {
    module: String,
    action: String,
    method: FormMethod,
    path: String,
    query_string: String,
    query: Vec<(String, String)>,
    body: Vec<(String, String)>,
    working_language: String,
    frontend_cache_path: PathBuf,
    date_picker: DatePickerSettings,
    csrf_token: Option<String>,
}

impl RequestContext {
    /// Create a context for a GET request to `module`/`action`.
    pub fn new(module: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            action: action.into(),
            method: FormMethod::Get,
            path: String::new(),
            query_string: String::new(),
            query: Vec::new(),
            body: Vec::new(),
            working_language: "en".to_string(),
            frontend_cache_path: PathBuf::from("./src/Frontend/Cache"),
            date_picker: DatePickerSettings::default(),
            csrf_token: None,
        }
    }

    /// Set the request path (`/backend/search/edit_synonym`).
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Set the raw query string (without the leading `?`).
    pub fn with_query_string(mut self, query_string: impl Into<String>) -> Self {
        let query_string = query_string.into();
        self.query = url::form_urlencoded::parse(query_string.as_bytes())
            .into_owned()
            .collect();
        self.query_string = query_string;
        self
    }

    /// Set the request method.
    pub fn with_method(mut self, method: FormMethod) -> Self {
        self.method = method;
        self
    }

    /// Set the decoded request body.
    pub fn with_body(mut self, body: Vec<(String, String)>) -> Self {
        self.body = body;
        self
    }

    /// Set the language content is being edited in.
    pub fn with_working_language(mut self, language: impl Into<String>) -> Self {
        self.working_language = language.into();
        self
    }

    /// Set the directory holding generated frontend cache files.
    pub fn with_frontend_cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.frontend_cache_path = path.into();
        self
    }

    /// Set the date-picker settings.
    pub fn with_date_picker(mut self, settings: DatePickerSettings) -> Self {
        self.date_picker = settings;
        self
    }

    /// Set the session's anti-forgery token.
    pub fn with_csrf_token(mut self, token: impl Into<String>) -> Self {
        self.csrf_token = Some(token.into());
        self
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn method(&self) -> FormMethod {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_string(&self) -> &str {
        &self.query_string
    }

    /// The request target relative to the site root: path plus query, no leading slash.
    pub fn request_uri(&self) -> String {
        let path = self.path.trim_start_matches('/');
        if self.query_string.is_empty() {
            path.to_string()
        } else {
            format!("{path}?{}", self.query_string)
        }
    }

    pub fn working_language(&self) -> &str {
        &self.working_language
    }

    pub fn frontend_cache_path(&self) -> &Path {
        &self.frontend_cache_path
    }

    pub fn date_picker(&self) -> &DatePickerSettings {
        &self.date_picker
    }

    pub fn csrf_token(&self) -> Option<&str> {
        self.csrf_token.as_deref()
    }

    /// Query parameter by name.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        first(&self.query, name)
    }

    /// First parameter named `name` in the data a `method` form submits.
    pub fn param(&self, method: FormMethod, name: &str) -> Option<&str> {
        first(self.source(method), name)
    }

    /// All parameters named `name` or `name[]` in the data a `method` form submits.
    pub fn params(&self, method: FormMethod, name: &str) -> Vec<&str> {
        let list_name = format!("{name}[]");
        self.source(method)
            .iter()
            .filter(|(key, _)| key == name || *key == list_name)
            .map(|(_, value)| value.as_str())
            .collect()
    }

    /// Path of the editor's internal link list for the working language.
    pub fn editor_link_list(&self) -> PathBuf {
        self.frontend_cache_path
            .join("Navigation")
            .join(format!("editor_link_list_{}.js", self.working_language))
    }

    fn source(&self, method: FormMethod) -> &[(String, String)] {
        match method {
            FormMethod::Get => &self.query,
            FormMethod::Post => &self.body,
        }
    }
}

fn first<'a>(pairs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}
