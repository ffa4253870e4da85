#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Synonym editing tests, run against the real router.

mod common;

use atrium_test_utils::{assert, encoded_body, form_action, input_value};
use axum::http::StatusCode;
use common::{TestApp, body_string, extract_cookies, location};

const EDIT_URL: &str = "/backend/search/edit_synonym?id=1";

fn app() -> TestApp {
    TestApp::with_synonyms(&[("cms", "content management"), ("blog", "weblog")])
}

/// Load the edit form, returning the session cookie and the form token.
async fn open_edit_form(app: &TestApp) -> (String, String) {
    let response = app.get(EDIT_URL, "").await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookies = extract_cookies(&response);
    assert!(!cookies.is_empty(), "session cookie should be set");

    let html = body_string(response).await;
    let token = input_value(&html, "form_token").expect("form token in page");
    assert_eq!(token.len(), 64);
    (cookies, token)
}

#[tokio::test]
async fn test_edit_form_renders_current_values() {
    let app = app();
    let response = app.get(EDIT_URL, "").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;

    assert::contains(&html, r#"id="editItem""#);
    assert::contains(&html, r#"class="atrium-form submitWithLink""#);
    assert::contains(&html, r#"name="form" value="editItem""#);
    assert_eq!(input_value(&html, "term").as_deref(), Some("cms"));
    assert_eq!(
        input_value(&html, "synonym").as_deref(),
        Some("content management")
    );
    assert::contains(&html, r#"class="form-control synonymBox""#);
    assert::not_contains(&html, "formError");
}

#[tokio::test]
async fn test_form_posts_back_to_the_edit_route() {
    let app = app();
    let response = app.get(EDIT_URL, "").await;
    let cookies = extract_cookies(&response);
    let html = body_string(response).await;

    let action = form_action(&html).expect("form tag with an action");
    assert_eq!(action, EDIT_URL);

    let token = input_value(&html, "form_token").unwrap();
    let body = encoded_body(&[
        ("form", "editItem"),
        ("form_token", &token),
        ("term", "cms"),
        ("synonym", "content management"),
    ]);
    let response = app.post_form(&action, body, &cookies).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        "/backend/search/synonyms?report=edited-synonym&var=cms&highlight=row-1"
    );
}

#[tokio::test]
async fn test_valid_submission_updates_and_redirects() {
    let app = app();
    let (cookies, token) = open_edit_form(&app).await;

    let body = encoded_body(&[
        ("form", "editItem"),
        ("form_token", &token),
        ("term", "  content tools "),
        ("synonym", "cms, site builder"),
    ]);
    let response = app.post_form(EDIT_URL, body, &cookies).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        "/backend/search/synonyms?report=edited-synonym&var=content%20tools&highlight=row-1"
    );

    let synonym = app.state.synonyms().get(1).unwrap();
    assert_eq!(synonym.term, "content tools");
    assert_eq!(synonym.synonym, "cms, site builder");
}

#[tokio::test]
async fn test_empty_fields_rerender_with_errors() {
    let app = app();
    let (cookies, token) = open_edit_form(&app).await;

    let body = encoded_body(&[
        ("form", "editItem"),
        ("form_token", &token),
        ("term", " "),
        ("synonym", ""),
    ]);
    let response = app.post_form(EDIT_URL, body, &cookies).await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_string(response).await;
    assert::contains(&html, r#"<span class="formError">Term is required.</span>"#);
    assert::contains(&html, r#"<span class="formError">Synonym is required.</span>"#);
    assert::contains(&html, "Not all fields were filled in correctly.");
    assert::contains(&html, r#"class="form-control synonymBox form-control danger synonymBox""#);
    assert_eq!(app.state.synonyms().get(1).unwrap().term, "cms");
}

#[tokio::test]
async fn test_term_of_another_synonym_is_rejected() {
    let app = app();
    let (cookies, token) = open_edit_form(&app).await;

    let body = encoded_body(&[
        ("form", "editItem"),
        ("form_token", &token),
        ("term", "blog"),
        ("synonym", "weblog"),
    ]);
    let response = app.post_form(EDIT_URL, body, &cookies).await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_string(response).await;
    assert::contains(&html, "Term already exists.");
    assert_eq!(input_value(&html, "term").as_deref(), Some("blog"));
    assert_eq!(app.state.synonyms().get(1).unwrap().term, "cms");
}

#[tokio::test]
async fn test_keeping_own_term_is_allowed() {
    let app = app();
    let (cookies, token) = open_edit_form(&app).await;

    let body = encoded_body(&[
        ("form", "editItem"),
        ("form_token", &token),
        ("term", "cms"),
        ("synonym", "content management system"),
    ]);
    let response = app.post_form(EDIT_URL, body, &cookies).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        app.state.synonyms().get(1).unwrap().synonym,
        "content management system"
    );
}

#[tokio::test]
async fn test_forged_token_is_not_saved() {
    let app = app();
    let (cookies, _token) = open_edit_form(&app).await;

    let body = encoded_body(&[
        ("form", "editItem"),
        ("form_token", "forged"),
        ("term", "hijacked"),
        ("synonym", "x"),
    ]);
    let response = app.post_form(EDIT_URL, body, &cookies).await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_string(response).await;
    assert::contains(&html, "Not all fields were filled in correctly.");
    assert_eq!(app.state.synonyms().get(1).unwrap().term, "cms");
}

#[tokio::test]
async fn test_submission_without_session_is_rejected() {
    let app = app();
    let (_cookies, token) = open_edit_form(&app).await;

    // A fresh session gets its own token, so the earlier one no longer matches.
    let body = encoded_body(&[
        ("form", "editItem"),
        ("form_token", &token),
        ("term", "hijacked"),
        ("synonym", "x"),
    ]);
    let response = app.post_form(EDIT_URL, body, "").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.state.synonyms().get(1).unwrap().term, "cms");
}

#[tokio::test]
async fn test_unknown_id_redirects_to_overview() {
    let app = app();
    for uri in [
        "/backend/search/edit_synonym?id=99",
        "/backend/search/edit_synonym?id=0",
        "/backend/search/edit_synonym?id=-1",
        "/backend/search/edit_synonym?id=abc",
        "/backend/search/edit_synonym",
    ] {
        let response = app.get(uri, "").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(
            location(&response),
            "/backend/search/synonyms?error=non-existing"
        );
    }
}

#[tokio::test]
async fn test_overview_lists_synonyms_with_report() {
    let app = app();
    let response = app
        .get(
            "/backend/search/synonyms?report=edited-synonym&var=cms&highlight=row-1",
            "",
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_string(response).await;
    assert::contains(&html, "was saved.");
    assert::contains(&html, r#"<tr id="row-1" class="highlighted">"#);
    assert::contains(&html, r#"<tr id="row-2">"#);
    assert::contains(&html, "content management");
    assert::contains(&html, "weblog");
}

#[tokio::test]
async fn test_overview_shows_error() {
    let app = app();
    let response = app
        .get("/backend/search/synonyms?error=non-existing", "")
        .await;
    let html = body_string(response).await;
    assert::contains(&html, "This item doesn");
}

#[tokio::test]
async fn test_health() {
    let app = app();
    let response = app.get("/health", "").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["status"], "healthy");
    assert!(body["templates"].as_u64().unwrap() >= 3);
}
