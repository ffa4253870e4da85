//! Locale backend route handlers: saving a translation from the backend.

use axum::{
    Form, Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_sessions::Session;
use tracing::{info, warn};

use crate::error::AppResult;
use crate::form::{TOKEN_MISMATCH, csrf};
use crate::locale::TranslationInput;
use crate::state::AppState;

/// Create the locale backend router.
pub fn router() -> Router<AppState> {
    Router::new().route("/backend/locale/save_translation", post(save_translation))
}

/// Posted translation plus the session's form token.
#[derive(Debug, Deserialize)]
struct SaveTranslationForm {
    #[serde(default)]
    form_token: String,
    #[serde(flatten)]
    translation: TranslationInput,
}

/// Body of every backend ajax reply.
#[derive(Debug, Serialize)]
struct AjaxReply {
    code: u16,
    data: Option<Value>,
    message: Option<String>,
}

fn reply(status: StatusCode, data: Option<Value>, message: Option<String>) -> Response {
    let body = AjaxReply {
        code: status.as_u16(),
        data,
        message,
    };
    (status, Json(body)).into_response()
}

/// POST /backend/locale/save_translation
///
/// Answers 200 once the translation is stored, 500 with the reason when the
/// posted values are refused, 403 when the form token does not match.
async fn save_translation(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SaveTranslationForm>,
) -> AppResult<Response> {
    let expected = csrf::session_token(&session).await?;
    if !csrf::tokens_match(&expected, &form.form_token) {
        warn!("translation rejected: form token mismatch");
        return Ok(reply(
            StatusCode::FORBIDDEN,
            None,
            Some(TOKEN_MISMATCH.to_string()),
        ));
    }

    let (key, value) = match state.config().locale_rules().validate(form.translation) {
        Ok(valid) => valid,
        Err(e) => {
            warn!(error = %e, "translation rejected");
            return Ok(reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                None,
                Some(e.to_string()),
            ));
        }
    };

    let (translation, created) = state.translations().save(key, value);
    info!(
        id = translation.id,
        name = %translation.key.name,
        language = %translation.key.language,
        created,
        "translation saved"
    );

    Ok(reply(
        StatusCode::OK,
        Some(json!({ "id": translation.id, "created": created })),
        None,
    ))
}
