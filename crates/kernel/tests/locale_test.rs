#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Translation saving tests, run against the real router.

mod common;

use atrium_kernel::locale::{Application, TranslationKey};
use atrium_test_utils::encoded_body;
use axum::http::StatusCode;
use common::{TestApp, body_string};
use serde_json::Value;

const SAVE_URL: &str = "/backend/locale/save_translation";

/// An app plus a session cookie and its form token.
async fn session() -> (TestApp, String, String) {
    let app = TestApp::with_synonyms(&[("cms", "content management")]);
    let (cookies, token) = app
        .open_session("/backend/search/edit_synonym?id=1")
        .await;
    (app, cookies, token)
}

async fn save(app: &TestApp, cookies: &str, pairs: &[(&str, &str)]) -> (StatusCode, Value) {
    let response = app.post_form(SAVE_URL, encoded_body(pairs), cookies).await;
    let status = response.status();
    let body = serde_json::from_str(&body_string(response).await).unwrap();
    (status, body)
}

fn label(token: &str, value: &str) -> Vec<(&'static str, String)> {
    vec![
        ("form_token", token.to_string()),
        ("language", "en".to_string()),
        ("module", "Search".to_string()),
        ("name", "EditSynonym".to_string()),
        ("type", "lbl".to_string()),
        ("application", "Backend".to_string()),
        ("value", value.to_string()),
    ]
}

fn with(pairs: &[(&'static str, String)], name: &str, value: &str) -> Vec<(&'static str, String)> {
    pairs
        .iter()
        .map(|(k, v)| {
            if *k == name {
                (*k, value.to_string())
            } else {
                (*k, v.clone())
            }
        })
        .collect()
}

fn borrowed<'a>(pairs: &'a [(&'static str, String)]) -> Vec<(&'static str, &'a str)> {
    pairs.iter().map(|(k, v)| (*k, v.as_str())).collect()
}

fn search_label(language: &str) -> TranslationKey {
    TranslationKey {
        application: Application::Backend,
        module: "Search".to_string(),
        language: language.to_string(),
        translation_type: "lbl".to_string(),
        name: "EditSynonym".to_string(),
    }
}

#[tokio::test]
async fn test_save_inserts_then_updates() {
    let (app, cookies, token) = session().await;

    let (status, body) = save(&app, &cookies, &borrowed(&label(&token, "Edit synonym"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 200);
    assert_eq!(body["data"]["created"], true);
    let id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = save(&app, &cookies, &borrowed(&label(&token, "Modify synonym"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["created"], false);
    assert_eq!(body["data"]["id"].as_i64(), Some(id));

    let stored = app.state.translations().get(&search_label("en")).unwrap();
    assert_eq!(stored.value, "Modify synonym");
    assert_eq!(app.state.translations().list().len(), 1);

    let dutch = with(&label(&token, "Synoniem bewerken"), "language", "nl");
    let (status, body) = save(&app, &cookies, &borrowed(&dutch)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["created"], true);
    assert_eq!(app.state.translations().list().len(), 2);
}

#[tokio::test]
async fn test_invalid_values_are_refused() {
    let (app, cookies, token) = session().await;
    let base = label(&token, "Edit synonym");

    for (name, value) in [
        ("value", "   "),
        ("language", "fr"),
        ("module", "Blog"),
        ("type", "xyz"),
        ("application", "Api"),
    ] {
        let (status, body) = save(&app, &cookies, &borrowed(&with(&base, name, value))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{name}={value}");
        assert_eq!(body["code"], 500);
        assert_eq!(body["message"], "Invalid value.");
    }

    let frontend = with(&base, "application", "Frontend");
    let (status, _) = save(&app, &cookies, &borrowed(&frontend)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let frontend_core = with(&frontend, "module", "Core");
    let (status, _) = save(&app, &cookies, &borrowed(&frontend_core)).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(app.state.translations().list().len(), 1);
}

#[tokio::test]
async fn test_action_values_must_be_url_safe() {
    let (app, cookies, token) = session().await;
    let action = with(&label(&token, ""), "type", "act");

    let (status, body) = save(&app, &cookies, &borrowed(&with(&action, "value", "Edit Synonym"))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "The action name contains invalid characters.");

    let (status, _) = save(&app, &cookies, &borrowed(&with(&action, "value", "edit-synonym"))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_forged_token_is_forbidden() {
    let (app, cookies, _token) = session().await;

    let (status, body) = save(&app, &cookies, &borrowed(&label("forged", "Edit synonym"))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 403);
    assert!(app.state.translations().list().is_empty());

    let (status, _) = save(&app, "", &borrowed(&label("", "Edit synonym"))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(app.state.translations().list().is_empty());
}
