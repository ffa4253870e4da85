//! The CMS form builder: typed fields with backend-wide defaults and a
//! submit/validate/render lifecycle.

use std::collections::{BTreeMap, HashSet};
use std::fmt::{self, Write};
use std::fs;
use std::path::Path;
use std::time::UNIX_EPOCH;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::context::RequestContext;
use crate::header::{AssetHeader, JsAsset};

use super::csrf::tokens_match;
use super::date::DateMode;
use super::error::FormError;
use super::render::{CHECKBOX_ON, camel_case, html_escape};
use super::types::{ButtonType, Field, FieldKind, FormMethod};

/// Hidden field carrying the form's name; its presence marks a submission.
pub const FORM_MARKER: &str = "form";

/// Hidden field carrying the anti-forgery token.
pub const TOKEN_FIELD: &str = "form_token";

/// Fields left out of [`FormBuilder::values`].
pub const DEFAULT_EXCLUDED: &[&str] = &[FORM_MARKER, "save", TOKEN_FIELD, "_utf8"];

/// Name the client reserves for its submit-with-link behaviour.
const RESERVED_SUBMIT_NAME: &str = "submit";

/// Class every backend form carries.
const FORM_CLASS: &str = "atrium-form submitWithLink";

/// Message recorded on the token field when the token does not match.
pub const TOKEN_MISMATCH: &str = "Invalid form token. Please reload the page and try again.";

/// Scripts the rich-text editor needs, in load order.
const EDITOR_SCRIPTS: &[&str] = &[
    "ckeditor/ckeditor.js",
    "ckeditor/adapters/jquery.js",
    "ckfinder/ckfinder.js",
];

/// Construction options for [`FormBuilder`].
#[derive(Debug, Clone)]
pub struct FormOptions {
    name: Option<String>,
    action: Option<String>,
    method: FormMethod,
    use_token: bool,
    use_global_error: bool,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            name: None,
            action: None,
            method: FormMethod::Post,
            use_token: true,
            use_global_error: true,
        }
    }
}

impl FormOptions {
    /// Name the form; derived from the route when unset.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the URL the form submits to; derived from the query string when unset.
    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Set the form method.
    pub fn method(mut self, method: FormMethod) -> Self {
        self.method = method;
        self
    }

    /// Do not attach an anti-forgery token.
    pub fn without_token(mut self) -> Self {
        self.use_token = false;
        self
    }

    /// Do not flag a page-level error when validation fails.
    pub fn without_global_error(mut self) -> Self {
        self.use_global_error = false;
        self
    }
}

/// Opening-tag data assigned to templates under the form's name.
#[derive(Debug, Clone, Serialize)]
pub struct FormView {
    pub name: String,
    pub action: String,
    pub method: FormMethod,
    pub attributes: BTreeMap<String, String>,
    /// `<form ...>` opening tag.
    pub open: String,
    /// Markup of the hidden marker and token fields.
    pub hidden: String,
}

/// A form bound to one request.
///
/// Create one per request, add fields, then ask [`is_submitted`] and
/// [`is_correct`] to decide between processing [`values`] and re-rendering
/// with [`render`].
///
/// [`is_submitted`]: Self::is_submitted
/// [`is_correct`]: Self::is_correct
/// [`values`]: Self::values
/// [`render`]: Self::render
pub struct FormBuilder<'r> {
    ctx: &'r RequestContext,
    header: Option<&'r mut dyn AssetHeader>,
    name: String,
    action: String,
    method: FormMethod,
    use_token: bool,
    use_global_error: bool,
    parameters: BTreeMap<String, String>,
    fields: Vec<Field>,
    submitted: bool,
    validated: bool,
    correct: bool,
}

impl<'r> FormBuilder<'r> {
    /// Create a form for the request described by `ctx`.
    pub fn new(ctx: &'r RequestContext, options: FormOptions) -> Self {
        let name = options.name.unwrap_or_else(|| {
            camel_case(&format!("{}_{}", ctx.module(), ctx.action()), true)
        });
        let action = options
            .action
            .unwrap_or_else(|| format!("/{}", ctx.request_uri()));

        let submitted =
            ctx.method() == options.method && ctx.param(options.method, FORM_MARKER) == Some(name.as_str());

        let mut parameters = BTreeMap::new();
        parameters.insert("id".to_string(), name.clone());
        parameters.insert("class".to_string(), FORM_CLASS.to_string());

        let mut form = Self {
            ctx,
            header: None,
            name,
            action,
            method: options.method,
            use_token: options.use_token,
            use_global_error: options.use_global_error,
            parameters,
            fields: Vec::new(),
            submitted,
            validated: false,
            correct: true,
        };

        form.fields.push(Field::hidden(FORM_MARKER, form.name.clone()));
        if form.use_token {
            let token = ctx.csrf_token().unwrap_or_default().to_string();
            form.fields.push(Field::hidden(TOKEN_FIELD, token));
        }
        for field in &mut form.fields {
            field.resolve_classes();
        }

        debug!(
            form = %form.name,
            action = %form.action,
            method = form.method.as_str(),
            submitted,
            "form created"
        );
        form
    }

    /// Create a POST form with the given name and default options.
    pub fn named(ctx: &'r RequestContext, name: impl Into<String>) -> Self {
        Self::new(ctx, FormOptions::default().name(name))
    }

    /// Attach the page's asset header; editor fields register scripts with it.
    pub fn with_header(mut self, header: &'r mut dyn AssetHeader) -> Self {
        self.header = Some(header);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn method(&self) -> FormMethod {
        self.method
    }

    /// Rendering attributes of the `<form>` tag (`id`, `class`, ...).
    pub fn parameters(&self) -> &BTreeMap<String, String> {
        &self.parameters
    }

    /// Set a rendering attribute of the `<form>` tag.
    pub fn set_parameter(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.parameters.insert(key.into(), value.into());
    }

    // ----- registration -----

    /// Register a field, applying the backend defaults for its variant.
    ///
    /// When the form was submitted the field takes its value from the
    /// submitted data; otherwise it keeps the value it was built with.
    pub fn add(&mut self, mut field: Field) -> Result<&mut Field, FormError> {
        if field.name().is_empty() {
            return Err(FormError::EmptyName);
        }
        if self.has_field(field.name()) {
            return Err(FormError::DuplicateName(field.name().to_string()));
        }

        match field.kind() {
            FieldKind::Button {
                button_type: ButtonType::Submit,
                ..
            } if field.name() == RESERVED_SUBMIT_NAME => {
                return Err(FormError::ReservedName(field.name().to_string()));
            }
            FieldKind::Date {
                mode,
                bound,
                bound2,
            } => {
                let settings = self.ctx.date_picker();
                let attributes = mode.attributes(field.name(), *bound, *bound2, settings)?;
                field.attach_picker(settings, attributes);
            }
            FieldKind::Editor => {
                let header = self
                    .header
                    .as_deref_mut()
                    .ok_or_else(|| FormError::MissingAssetHeader(field.name().to_string()))?;
                register_editor_assets(header, self.ctx);
            }
            _ => {}
        }

        field.resolve_classes();
        if self.submitted {
            let value = self.submitted_value(&field);
            field.bind(value);
        }

        debug!(
            form = %self.name,
            field = %field.name(),
            kind = field.kind().type_name(),
            "field added"
        );
        let index = self.fields.len();
        self.fields.push(field);
        Ok(&mut self.fields[index])
    }

    /// Add a button. A submit button may not be named `submit`.
    pub fn add_button(
        &mut self,
        name: &str,
        label: &str,
        button_type: ButtonType,
    ) -> Result<&mut Field, FormError> {
        self.add(Field::button(name, label).button_type(button_type))
    }

    /// Add a single checkbox.
    pub fn add_checkbox(&mut self, name: &str, checked: bool) -> Result<&mut Field, FormError> {
        self.add(Field::checkbox(name).value(checked))
    }

    /// Add a date field.
    ///
    /// `value` is a Unix timestamp. `mode` is `from`, `till`, `range`, or
    /// anything else for an unconstrained picker; bounds are Unix timestamps.
    pub fn add_date(
        &mut self,
        name: &str,
        value: Option<i64>,
        mode: Option<&str>,
        bound: Option<i64>,
        bound2: Option<i64>,
    ) -> Result<&mut Field, FormError> {
        let mut field = Field::date(name).date_mode(DateMode::from_param(mode), bound, bound2);
        if let Some(timestamp) = value {
            field = field.value(timestamp);
        }
        self.add(field)
    }

    /// Add a dropdown.
    pub fn add_dropdown(
        &mut self,
        name: &str,
        options: Vec<(String, String)>,
        selected: Option<Value>,
        multiple: bool,
    ) -> Result<&mut Field, FormError> {
        let mut field = Field::dropdown(name, options);
        if multiple {
            field = field.multiple();
        }
        if let Some(selected) = selected {
            field = field.value(selected);
        }
        self.add(field)
    }

    /// Add a rich-text editor, registering its scripts with the asset header.
    pub fn add_editor(&mut self, name: &str, value: Option<&str>) -> Result<&mut Field, FormError> {
        let mut field = Field::editor(name);
        if let Some(value) = value {
            field = field.value(value);
        }
        self.add(field)
    }

    /// Add a file upload field.
    pub fn add_file(&mut self, name: &str) -> Result<&mut Field, FormError> {
        self.add(Field::file(name))
    }

    /// Add an image upload field.
    pub fn add_image(&mut self, name: &str) -> Result<&mut Field, FormError> {
        self.add(Field::image(name))
    }

    /// Add a group of checkboxes.
    pub fn add_multi_checkbox(
        &mut self,
        name: &str,
        options: Vec<(String, String)>,
        checked: Vec<String>,
    ) -> Result<&mut Field, FormError> {
        self.add(Field::multi_checkbox(name, options).value(checked))
    }

    /// Add a password field.
    pub fn add_password(
        &mut self,
        name: &str,
        value: Option<&str>,
        max_length: Option<usize>,
    ) -> Result<&mut Field, FormError> {
        let mut field = Field::password(name).max_length(max_length);
        if let Some(value) = value {
            field = field.value(value);
        }
        self.add(field)
    }

    /// Add a radio button group.
    pub fn add_radiobutton(
        &mut self,
        name: &str,
        options: Vec<(String, String)>,
        checked: Option<&str>,
    ) -> Result<&mut Field, FormError> {
        let mut field = Field::radiobutton(name, options);
        if let Some(checked) = checked {
            field = field.value(checked);
        }
        self.add(field)
    }

    /// Add a single-line text field (max length 255).
    pub fn add_text(&mut self, name: &str, value: Option<&str>) -> Result<&mut Field, FormError> {
        let mut field = Field::text(name);
        if let Some(value) = value {
            field = field.value(value);
        }
        self.add(field)
    }

    /// Add a textarea.
    pub fn add_textarea(
        &mut self,
        name: &str,
        value: Option<&str>,
    ) -> Result<&mut Field, FormError> {
        let mut field = Field::textarea(name);
        if let Some(value) = value {
            field = field.value(value);
        }
        self.add(field)
    }

    /// Add a time field (`HH:MM`).
    pub fn add_time(&mut self, name: &str, value: Option<&str>) -> Result<&mut Field, FormError> {
        let mut field = Field::time(name);
        if let Some(value) = value {
            field = field.value(value);
        }
        self.add(field)
    }

    // ----- lookup -----

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name() == name)
    }

    pub fn field(&self, name: &str) -> Result<&Field, FormError> {
        self.fields
            .iter()
            .find(|f| f.name() == name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))
    }

    pub fn field_mut(&mut self, name: &str) -> Result<&mut Field, FormError> {
        self.fields
            .iter_mut()
            .find(|f| f.name() == name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))
    }

    /// Registered fields in insertion order, internal fields included.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    // ----- lifecycle -----

    /// Whether the current request submitted this form.
    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// Values of every field not named in `excluded`, keyed by field name.
    pub fn get_values(&self, excluded: &[&str]) -> BTreeMap<String, Value> {
        let excluded: HashSet<&str> = excluded.iter().copied().collect();
        self.fields
            .iter()
            .filter(|f| !excluded.contains(f.name()))
            .map(|f| (f.name().to_string(), f.get_value().clone()))
            .collect()
    }

    /// Values of every field except the internal ones in [`DEFAULT_EXCLUDED`].
    pub fn values(&self) -> BTreeMap<String, Value> {
        self.get_values(DEFAULT_EXCLUDED)
    }

    /// Trim surrounding whitespace from free-text values.
    pub fn cleanup_fields(&mut self) {
        for field in &mut self.fields {
            field.trim();
        }
    }

    /// Whether no field is invalid.
    ///
    /// With `revalidate` (the usual call) validation runs again against the
    /// current values; otherwise the previous outcome is reused if there is one.
    pub fn is_correct(&mut self, revalidate: bool) -> bool {
        if revalidate || !self.validated {
            self.validate();
        }
        self.correct
    }

    /// Validate every field.
    pub fn validate(&mut self) {
        let submitted = self.submitted;
        for field in &mut self.fields {
            field.validate(submitted);
        }

        if self.use_token && submitted {
            let posted = self.ctx.param(self.method, TOKEN_FIELD).unwrap_or_default();
            let matches = self
                .ctx
                .csrf_token()
                .is_some_and(|expected| tokens_match(expected, posted));
            if !matches {
                if let Some(field) = self.fields.iter_mut().find(|f| f.name() == TOKEN_FIELD) {
                    field.mark_invalid(TOKEN_MISMATCH);
                }
            }
        }

        self.correct = !self.fields.iter().any(Field::is_invalid);
        self.validated = true;
        debug!(form = %self.name, submitted, correct = self.correct, "form validated");
    }

    /// Assign the form to a template context.
    ///
    /// Inserts a [`FormView`] under the form's name, each field's markup under
    /// its template key, and its error under the key plus `Error`. If the
    /// global error is enabled and the form was submitted but is not correct,
    /// `formError` is set to `true`.
    pub fn render(&mut self, context: &mut tera::Context) {
        let correct = self.is_correct(true);

        let mut hidden = String::new();
        for field in &self.fields {
            if matches!(field.kind(), FieldKind::Hidden)
                && (field.name() == FORM_MARKER || field.name() == TOKEN_FIELD)
            {
                hidden.push_str(&field.markup());
                continue;
            }
            let key = field.template_key();
            context.insert(format!("{key}Error"), &field.error_markup());
            context.insert(key, &field.markup());
        }

        context.insert(self.name.as_str(), &self.view(hidden));

        if self.use_global_error && self.submitted && !correct {
            context.insert("formError", &true);
        }
    }

    fn view(&self, hidden: String) -> FormView {
        let mut open = format!(
            r#"<form accept-charset="UTF-8" action="{}" method="{}""#,
            html_escape(&self.action),
            self.method.as_str()
        );
        for (key, value) in &self.parameters {
            // SAFETY: write!() to String is infallible
            #[allow(clippy::unwrap_used)]
            write!(open, r#" {}="{}""#, html_escape(key), html_escape(value)).unwrap();
        }
        if self
            .fields
            .iter()
            .any(|f| matches!(f.kind(), FieldKind::File | FieldKind::Image))
        {
            open.push_str(r#" enctype="multipart/form-data""#);
        }
        open.push('>');

        FormView {
            name: self.name.clone(),
            action: self.action.clone(),
            method: self.method,
            attributes: self.parameters.clone(),
            open,
            hidden,
        }
    }

    /// The value a submitted request carries for `field`.
    fn submitted_value(&self, field: &Field) -> Value {
        let method = self.method;
        let posted = |name: &str| self.ctx.param(method, name);
        let list = |name: &str| {
            Value::Array(
                self.ctx
                    .params(method, name)
                    .into_iter()
                    .map(|v| Value::String(v.to_string()))
                    .collect(),
            )
        };

        match field.kind() {
            FieldKind::Checkbox => Value::Bool(posted(field.name()) == Some(CHECKBOX_ON)),
            FieldKind::MultiCheckbox { .. } | FieldKind::Dropdown { multiple: true, .. } => {
                list(field.name())
            }
            FieldKind::Button { .. } => field.default_value().clone(),
            FieldKind::File
            | FieldKind::Image
            | FieldKind::Radiobutton { .. }
            | FieldKind::Dropdown { .. } => {
                posted(field.name()).map_or(Value::Null, |v| Value::String(v.to_string()))
            }
            _ => Value::String(posted(field.name()).unwrap_or_default().to_string()),
        }
    }
}

impl fmt::Debug for FormBuilder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormBuilder")
            .field("name", &self.name)
            .field("action", &self.action)
            .field("method", &self.method)
            .field("submitted", &self.submitted)
            .field("fields", &self.fields.len())
            .finish()
    }
}

/// Register the editor scripts and, if generated, the link list for the
/// working language.
fn register_editor_assets(header: &mut dyn AssetHeader, ctx: &RequestContext) {
    for script in EDITOR_SCRIPTS {
        header.add_js(JsAsset::new(*script).group("Core").minify(false));
    }

    let link_list = ctx.editor_link_list();
    if let Some(modified) = modified_timestamp(&link_list) {
        let language = ctx.working_language();
        header.add_js(
            JsAsset::new(format!(
                "/src/Frontend/Cache/Navigation/editor_link_list_{language}.js?m={modified}"
            ))
            .minify(false)
            .absolute()
            .cache_bust(false),
        );
        debug!(language = %language, modified, "editor link list registered");
    }
}

/// Modification time of a regular file, in seconds since the epoch.
fn modified_timestamp(path: &Path) -> Option<u64> {
    let metadata = fs::metadata(path).ok().filter(|m| m.is_file())?;
    let modified = metadata.modified().ok()?;
    modified
        .duration_since(UNIX_EPOCH)
        .ok()
        .map(|age| age.as_secs())
}
