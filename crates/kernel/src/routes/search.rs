//! Search backend route handlers: synonym overview and editing.

use axum::{
    Router,
    body::Bytes,
    extract::{Query, State},
    http::Uri,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use serde::Deserialize;
use tera::Context;
use tower_sessions::Session;
use tracing::info;

use crate::error::AppResult;
use crate::form::{Field, FormBuilder, FormMethod};
use crate::header::Header;
use crate::routes::helpers::{render_template, request_context};
use crate::search::Synonym;
use crate::state::AppState;

/// Overview page the edit action returns to.
const SYNONYMS_URL: &str = "/backend/search/synonyms";

/// Create the search backend router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/backend/search/synonyms", get(synonyms))
        .route(
            "/backend/search/edit_synonym",
            get(edit_synonym_form).post(edit_synonym_submit),
        )
}

/// Messages passed back to the overview after an action.
#[derive(Debug, Default, Deserialize)]
pub struct OverviewQuery {
    pub report: Option<String>,
    pub error: Option<String>,
    pub var: Option<String>,
    pub highlight: Option<String>,
}

impl OverviewQuery {
    fn report_message(&self) -> Option<String> {
        let var = self.var.as_deref().unwrap_or_default();
        match self.report.as_deref()? {
            "edited-synonym" => Some(format!("The synonym for \"{var}\" was saved.")),
            "added-synonym" => Some(format!("The synonym for \"{var}\" was added.")),
            other => Some(other.replace('-', " ")),
        }
    }

    /// Id of the row to highlight, from `row-<id>`.
    fn highlight_id(&self) -> Option<i64> {
        self.highlight
            .as_deref()?
            .strip_prefix("row-")?
            .parse()
            .ok()
    }

    fn error_message(&self) -> Option<&'static str> {
        match self.error.as_deref()? {
            "non-existing" => Some("This item doesn't exist."),
            _ => Some("Something went wrong."),
        }
    }
}

/// Synonym overview.
async fn synonyms(State(state): State<AppState>, Query(params): Query<OverviewQuery>) -> Response {
    let mut context = Context::new();
    context.insert("synonyms", &state.synonyms().list());
    context.insert("report", &params.report_message());
    context.insert("error", &params.error_message());
    context.insert("highlight_id", &params.highlight_id());
    render_template(&state, "search/synonyms.html", &context)
}

/// Show the edit form.
async fn edit_synonym_form(
    State(state): State<AppState>,
    session: Session,
    uri: Uri,
) -> AppResult<Response> {
    edit_synonym(&state, &session, FormMethod::Get, &uri, &[]).await
}

/// Handle a submitted edit form.
async fn edit_synonym_submit(
    State(state): State<AppState>,
    session: Session,
    uri: Uri,
    body: Bytes,
) -> AppResult<Response> {
    edit_synonym(&state, &session, FormMethod::Post, &uri, &body).await
}

async fn edit_synonym(
    state: &AppState,
    session: &Session,
    method: FormMethod,
    uri: &Uri,
    body: &[u8],
) -> AppResult<Response> {
    let ctx = request_context(state, session, ("Search", "EditSynonym"), method, uri, body).await?;

    let id = ctx
        .query_param("id")
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(0);
    let Some(record) = state
        .synonyms()
        .exists_by_id(id)
        .then(|| state.synonyms().get(id))
        .flatten()
    else {
        return Ok(Redirect::to(&format!("{SYNONYMS_URL}?error=non-existing")).into_response());
    };

    let mut form = FormBuilder::named(&ctx, "editItem");
    form.add_text("term", Some(&record.term))?;
    form.add(
        Field::text("synonym")
            .value(record.synonym.as_str())
            .class("form-control synonymBox")
            .error_class("form-control danger synonymBox"),
    )?;

    if form.is_submitted() {
        form.cleanup_fields();
        form.field_mut("synonym")?.require("Synonym is required.");
        form.field_mut("term")?.require("Term is required.");

        let term = form.field("term")?.text_value().unwrap_or_default().to_string();
        if state.synonyms().exists_by_term(&term, Some(id)) {
            form.field_mut("term")?.add_error("Term already exists.");
        }

        if form.is_correct(true) {
            let synonym = Synonym {
                id,
                term,
                synonym: form
                    .field("synonym")?
                    .text_value()
                    .unwrap_or_default()
                    .to_string(),
            };
            state.synonyms().update(synonym.clone());
            info!(id, term = %synonym.term, "synonym edited");

            return Ok(Redirect::to(&format!(
                "{SYNONYMS_URL}?report=edited-synonym&var={}&highlight=row-{id}",
                urlencoding::encode(&synonym.term)
            ))
            .into_response());
        }
    }

    let mut context = Context::new();
    form.render(&mut context);
    Header::new(state.config().asset_version.as_str()).assign(&mut context);
    context.insert("id", &record.id);
    context.insert("term", &record.term);
    Ok(render_template(state, "search/edit_synonym.html", &context))
}
