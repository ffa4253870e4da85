//! Shared route helpers for page rendering.

use axum::http::{StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use tower_sessions::Session;

use crate::context::RequestContext;
use crate::error::AppResult;
use crate::form::{FormMethod, csrf, html_escape};
use crate::state::AppState;

/// Collect what backend forms need to know about the current request.
///
/// Reads (and on first use creates) the session's anti-forgery token, so
/// this must run before any form is built.
pub async fn request_context(
    state: &AppState,
    session: &Session,
    route: (&str, &str),
    method: FormMethod,
    uri: &Uri,
    body: &[u8],
) -> AppResult<RequestContext> {
    let token = csrf::session_token(session).await?;
    let config = state.config();
    let (module, action) = route;

    Ok(RequestContext::new(module, action)
        .with_path(uri.path())
        .with_query_string(uri.query().unwrap_or_default())
        .with_method(method)
        .with_body(url::form_urlencoded::parse(body).into_owned().collect())
        .with_working_language(config.working_language.as_str())
        .with_frontend_cache_path(config.frontend_cache_path.as_path())
        .with_date_picker(config.date_picker())
        .with_csrf_token(token))
}

/// Render a backend template, falling back to an error page.
pub fn render_template(state: &AppState, template: &str, context: &tera::Context) -> Response {
    match state.theme().render(template, context) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), template = %template, "failed to render template");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(format!(
                    r#"<!DOCTYPE html>
<html><head><title>Error</title></head>
<body><h1>Template Error</h1><pre>{}</pre></body></html>"#,
                    html_escape(&e.to_string())
                )),
            )
                .into_response()
        }
    }
}
