#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common test utilities for integration tests.
//!
//! This module provides test infrastructure that uses the REAL kernel code,
//! not mock implementations. Every [`TestApp`] owns its own in-memory state,
//! so tests can run in parallel without sharing synonyms or sessions.

#![allow(dead_code)]

use std::path::PathBuf;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, header};
use axum::response::Response;
use http_body_util::BodyExt;
use tower::ServiceExt;

use atrium_kernel::config::Config;
use atrium_kernel::routes;
use atrium_kernel::search::SynonymStore;
use atrium_kernel::state::AppState;
use atrium_kernel::theme::ThemeEngine;

/// Templates shipped with the workspace.
pub fn templates_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../templates")
}

/// Configuration for tests: real templates, default date settings.
pub fn test_config() -> Config {
    Config {
        port: 0,
        templates_dir: templates_dir(),
        frontend_cache_path: PathBuf::from("./src/Frontend/Cache"),
        working_language: "en".to_string(),
        date_mask: "d/m/Y".to_string(),
        date_first_day: 1,
        asset_version: "test".to_string(),
        cookie_secure: false,
        synonyms_file: None,
        languages: vec!["en".to_string(), "nl".to_string()],
        modules: vec!["Core".to_string(), "Locale".to_string(), "Search".to_string()],
    }
}

/// Test application wrapping the real router.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    /// Create an app whose synonym store holds `synonyms` (term, synonym).
    pub fn with_synonyms(synonyms: &[(&str, &str)]) -> Self {
        let config = test_config();
        let theme = ThemeEngine::new(&config.templates_dir).expect("Failed to load templates");
        let store = SynonymStore::new();
        for (term, synonym) in synonyms {
            store.insert(*term, *synonym);
        }
        let state = AppState::from_parts(config, theme, store);
        Self {
            router: routes::app(state.clone()),
            state,
        }
    }

    /// Open a session by loading the form page at `uri`.
    ///
    /// Returns the session cookie and the form token rendered on the page.
    pub async fn open_session(&self, uri: &str) -> (String, String) {
        let response = self.get(uri, "").await;
        let cookies = extract_cookies(&response);
        let html = body_string(response).await;
        let token = atrium_test_utils::input_value(&html, "form_token")
            .expect("form token in page");
        (cookies, token)
    }

    /// Send a request to the test application.
    pub async fn request(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request")
    }

    /// Send a request with cookies from a previous response.
    pub async fn request_with_cookies(
        &self,
        mut request: Request<Body>,
        cookies: &str,
    ) -> Response {
        if !cookies.is_empty() {
            request.headers_mut().insert(
                header::COOKIE,
                cookies.parse().expect("Invalid cookie header"),
            );
        }
        self.request(request).await
    }

    /// GET a path.
    pub async fn get(&self, uri: &str, cookies: &str) -> Response {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.request_with_cookies(request, cookies).await
    }

    /// POST a form-encoded body to a path.
    pub async fn post_form(&self, uri: &str, body: String, cookies: &str) -> Response {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        self.request_with_cookies(request, cookies).await
    }
}

/// Extract Set-Cookie headers from a response for use in subsequent requests.
pub fn extract_cookies(response: &Response) -> String {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(atrium_test_utils::cookie_pair)
        .collect::<Vec<_>>()
        .join("; ")
}

/// The `Location` header of a redirect.
pub fn location(response: &Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .expect("missing Location header")
        .to_str()
        .unwrap()
        .to_string()
}

/// Read the full response body as a string.
pub async fn body_string(response: Response) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("Body is not UTF-8")
}
