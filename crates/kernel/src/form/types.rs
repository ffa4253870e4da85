//! Field types and per-variant defaults.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::date::{DateMode, DatePickerSettings};
use super::rule::{Rule, is_filled};

/// Message recorded when a submitted choice is not one of the offered options.
pub const INVALID_OPTION: &str = "Invalid value.";

/// Message recorded when a submitted date does not match the mask.
pub const INVALID_DATE: &str = "Invalid date.";

/// Message recorded when a submitted time is not `HH:MM`.
pub const INVALID_TIME: &str = "Invalid time.";

/// Message recorded when submitted text exceeds the field's maximum length.
pub const TOO_LONG: &str = "Maximum length exceeded.";

/// Default maximum length of text fields.
pub const TEXT_MAX_LENGTH: usize = 255;

/// HTTP method a form submits with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormMethod {
    Get,
    #[default]
    Post,
}

impl FormMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
        }
    }

    /// Parse a method name, case-insensitively.
    pub fn parse(method: &str) -> Option<Self> {
        if method.eq_ignore_ascii_case("get") {
            Some(Self::Get)
        } else if method.eq_ignore_ascii_case("post") {
            Some(Self::Post)
        } else {
            None
        }
    }
}

/// The `type` attribute of a button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonType {
    #[default]
    Submit,
    Button,
    Reset,
}

impl ButtonType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::Button => "button",
            Self::Reset => "reset",
        }
    }
}

/// Field variants with variant-specific configuration.
///
/// Options are `(value, label)` pairs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    /// Single-line text input.
    Text { max_length: Option<usize> },

    /// Multi-line text input.
    Textarea,

    /// Password input.
    Password { max_length: Option<usize> },

    /// Single checkbox.
    Checkbox,

    /// Group of checkboxes sharing one name.
    MultiCheckbox { options: Vec<(String, String)> },

    /// Radio button group.
    Radiobutton { options: Vec<(String, String)> },

    /// Select box.
    Dropdown {
        options: Vec<(String, String)>,
        multiple: bool,
    },

    /// Date picker. A range picker is a date in [`DateMode::Range`].
    Date {
        mode: DateMode,
        bound: Option<i64>,
        bound2: Option<i64>,
    },

    /// File upload.
    File,

    /// Image upload.
    Image,

    /// Time input (`HH:MM`).
    Time,

    /// Button.
    Button {
        label: String,
        button_type: ButtonType,
    },

    /// Rich-text editor (an HTML textarea plus client scripts).
    Editor,

    /// Hidden input.
    Hidden,
}

impl FieldKind {
    /// Get the type name as a string.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Textarea => "textarea",
            Self::Password { .. } => "password",
            Self::Checkbox => "checkbox",
            Self::MultiCheckbox { .. } => "multi_checkbox",
            Self::Radiobutton { .. } => "radiobutton",
            Self::Dropdown { .. } => "dropdown",
            Self::Date { .. } => "date",
            Self::File => "file",
            Self::Image => "image",
            Self::Time => "time",
            Self::Button { .. } => "button",
            Self::Editor => "editor",
            Self::Hidden => "hidden",
        }
    }

    /// CSS class and error class used when the caller gives none.
    pub fn default_classes(&self) -> (&'static str, &'static str) {
        match self {
            Self::Text { .. } => ("form-control atrium-form-text", "error"),
            Self::Textarea => ("form-control atrium-form-textarea", "error"),
            Self::Password { .. } => ("form-control atrium-form-password inputPassword", "error"),
            Self::Checkbox => ("atrium-form-checkbox", "error"),
            Self::MultiCheckbox { .. } => ("atrium-form-multi-checkbox", "error"),
            Self::Radiobutton { .. } => ("atrium-form-radio", "error"),
            Self::Dropdown { .. } => ("form-control atrium-form-select", "error"),
            Self::Date { .. } => ("form-control atrium-form-date inputDate", "error"),
            Self::File => ("atrium-form-file", "error"),
            Self::Image => ("atrium-form-image", "error"),
            Self::Time => ("form-control atrium-form-time inputTime", "error"),
            Self::Button { .. } => ("btn btn-primary", ""),
            Self::Editor | Self::Hidden => ("", ""),
        }
    }

    /// Whether the value is free text that `cleanup_fields` may trim.
    pub(crate) fn is_text_like(&self) -> bool {
        matches!(
            self,
            Self::Text { .. } | Self::Textarea | Self::Editor | Self::Date { .. } | Self::Time
        )
    }
}

/// Validation state of a field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "lowercase")]
pub enum FieldState {
    /// Not validated yet.
    #[default]
    Untouched,
    Valid,
    Invalid(String),
}

/// A single named input of a form.
///
/// Build one with a variant constructor and the chained setters, then hand it
/// to [`FormBuilder::add`](super::FormBuilder::add), which fills in the CMS
/// defaults. The `&mut` methods configure a field that is already registered.
#[derive(Debug)]
pub struct Field {
    name: String,
    kind: FieldKind,
    default: Value,
    value: Value,
    class: Option<String>,
    error_class: Option<String>,
    attributes: BTreeMap<String, String>,
    html: bool,
    rules: Vec<Rule>,
    errors: Vec<String>,
    state: FieldState,
    picker: Option<DatePickerSettings>,
}

impl Field {
    /// Create a single-line text field (max length 255).
    pub fn text(name: impl Into<String>) -> Self {
        Self::new(
            name,
            FieldKind::Text {
                max_length: Some(TEXT_MAX_LENGTH),
            },
        )
    }

    /// Create a textarea.
    pub fn textarea(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Textarea)
    }

    /// Create a password field.
    pub fn password(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Password { max_length: None })
    }

    /// Create an unchecked checkbox.
    pub fn checkbox(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Checkbox).value(false)
    }

    /// Create a checkbox group with nothing checked.
    pub fn multi_checkbox(name: impl Into<String>, options: Vec<(String, String)>) -> Self {
        Self::new(name, FieldKind::MultiCheckbox { options }).value(Value::Array(Vec::new()))
    }

    /// Create a radio button group.
    pub fn radiobutton(name: impl Into<String>, options: Vec<(String, String)>) -> Self {
        Self::new(name, FieldKind::Radiobutton { options })
    }

    /// Create a single-choice dropdown.
    pub fn dropdown(name: impl Into<String>, options: Vec<(String, String)>) -> Self {
        Self::new(
            name,
            FieldKind::Dropdown {
                options,
                multiple: false,
            },
        )
    }

    /// Create an unconstrained date field.
    pub fn date(name: impl Into<String>) -> Self {
        Self::new(
            name,
            FieldKind::Date {
                mode: DateMode::None,
                bound: None,
                bound2: None,
            },
        )
    }

    /// Create a file upload field.
    pub fn file(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::File)
    }

    /// Create an image upload field.
    pub fn image(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Image)
    }

    /// Create a time field.
    pub fn time(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Time)
    }

    /// Create a submit button.
    pub fn button(name: impl Into<String>, label: impl Into<String>) -> Self {
        let label = label.into();
        Self::new(
            name,
            FieldKind::Button {
                label: label.clone(),
                button_type: ButtonType::Submit,
            },
        )
        .value(label)
    }

    /// Create a rich-text editor field.
    pub fn editor(name: impl Into<String>) -> Self {
        let mut field = Self::new(name, FieldKind::Editor);
        field.html = true;
        field
    }

    /// Create a hidden field.
    pub fn hidden(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(name, FieldKind::Hidden).value(value)
    }

    fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: Value::Null,
            value: Value::Null,
            class: None,
            error_class: None,
            attributes: BTreeMap::new(),
            html: false,
            rules: Vec::new(),
            errors: Vec::new(),
            state: FieldState::Untouched,
            picker: None,
        }
    }

    /// Set the value shown until the form is submitted.
    ///
    /// Date fields accept a Unix timestamp and display it with the date mask.
    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.default = value.into();
        self.value = self.default.clone();
        self
    }

    /// Override the default CSS class.
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    /// Override the default error CSS class.
    pub fn error_class(mut self, class: impl Into<String>) -> Self {
        self.error_class = Some(class.into());
        self
    }

    /// Set max length for text and password fields.
    pub fn max_length(mut self, max: Option<usize>) -> Self {
        if let FieldKind::Text { max_length } | FieldKind::Password { max_length } = &mut self.kind
        {
            *max_length = max;
        }
        self
    }

    /// Allow multiple selections on a dropdown.
    pub fn multiple(mut self) -> Self {
        if let FieldKind::Dropdown { multiple, .. } = &mut self.kind {
            *multiple = true;
            if self.default.is_null() {
                self.default = Value::Array(Vec::new());
                self.value = self.default.clone();
            }
        }
        self
    }

    /// Constrain a date field. Bounds are Unix timestamps.
    pub fn date_mode(mut self, mode: DateMode, bound: Option<i64>, bound2: Option<i64>) -> Self {
        if let FieldKind::Date {
            mode: m,
            bound: b,
            bound2: b2,
        } = &mut self.kind
        {
            *m = mode;
            *b = bound;
            *b2 = bound2;
        }
        self
    }

    /// Set the `type` of a button.
    pub fn button_type(mut self, kind: ButtonType) -> Self {
        if let FieldKind::Button { button_type, .. } = &mut self.kind {
            *button_type = kind;
        }
        self
    }

    /// Mark the field as carrying HTML.
    pub fn html(mut self) -> Self {
        self.html = true;
        self
    }

    /// Add an HTML attribute.
    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Attach a validation rule.
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Require a value.
    pub fn required(self, message: impl Into<String>) -> Self {
        self.rule(Rule::filled(message))
    }

    // ----- registered-field configuration -----

    /// Attach a validation rule to a registered field.
    pub fn add_rule(&mut self, rule: Rule) -> &mut Self {
        self.rules.push(rule);
        self
    }

    /// Require a value on a registered field.
    pub fn require(&mut self, message: impl Into<String>) -> &mut Self {
        self.add_rule(Rule::filled(message))
    }

    /// Record an error found by the caller (e.g. a uniqueness check).
    ///
    /// Unlike rules, these persist across validation passes until
    /// [`clear_errors`](Self::clear_errors).
    pub fn add_error(&mut self, message: impl Into<String>) -> &mut Self {
        self.errors.push(message.into());
        self
    }

    /// Drop errors recorded with [`add_error`](Self::add_error).
    pub fn clear_errors(&mut self) -> &mut Self {
        self.errors.clear();
        self
    }

    /// Replace the current value.
    pub fn set_value(&mut self, value: impl Into<Value>) -> &mut Self {
        self.value = value.into();
        self
    }

    /// Set an HTML attribute on a registered field.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    // ----- accessors -----

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// The current value: submitted data when the form was submitted,
    /// the default otherwise.
    pub fn get_value(&self) -> &Value {
        &self.value
    }

    /// The value the field was constructed with.
    pub fn default_value(&self) -> &Value {
        &self.default
    }

    /// Current value as text, if it is a string.
    pub fn text_value(&self) -> Option<&str> {
        self.value.as_str()
    }

    /// Whether a checkbox is checked.
    pub fn is_checked(&self) -> bool {
        self.value.as_bool().unwrap_or(false)
    }

    /// Current value of a date field, parsed with the date mask.
    pub fn date_value(&self) -> Option<NaiveDate> {
        let picker = self.picker.as_ref()?;
        picker.parse(self.value.as_str()?)
    }

    pub fn class_name(&self) -> &str {
        self.class.as_deref().unwrap_or_default()
    }

    pub fn error_class_name(&self) -> &str {
        self.error_class.as_deref().unwrap_or_default()
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    pub fn get_attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn is_html(&self) -> bool {
        self.html
    }

    pub fn state(&self) -> &FieldState {
        &self.state
    }

    /// The validation message, if the field is invalid.
    pub fn error(&self) -> Option<&str> {
        match &self.state {
            FieldState::Invalid(message) => Some(message),
            _ => None,
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self.state, FieldState::Invalid(_))
    }

    // ----- used by the form builder -----

    /// Apply the variant's class defaults and mode-specific additions.
    pub(crate) fn resolve_classes(&mut self) {
        let (default_class, default_error) = self.kind.default_classes();
        let mut class = self
            .class
            .take()
            .unwrap_or_else(|| default_class.to_string());
        let mut error = self
            .error_class
            .take()
            .unwrap_or_else(|| default_error.to_string());

        match &self.kind {
            FieldKind::Editor => {
                class = join_classes("inputEditor", &class);
                error = join_classes("inputEditorError", &error);
            }
            FieldKind::Dropdown { multiple: true, .. } => {
                class = join_classes(&class, "selectMultiple");
                error = join_classes(&error, "selectMultipleError");
            }
            FieldKind::Date { mode, .. } => {
                let (class_suffix, error_suffix) = mode.class_suffixes();
                class = join_classes(&class, class_suffix);
                error = join_classes(&error, error_suffix);
            }
            _ => {}
        }

        self.class = Some(class);
        self.error_class = Some(error);
    }

    /// Attach date-picker settings and display a timestamp default with the mask.
    pub(crate) fn attach_picker(
        &mut self,
        settings: &DatePickerSettings,
        attributes: BTreeMap<String, String>,
    ) {
        self.attributes.extend(attributes);
        if let Some(timestamp) = self.default.as_i64() {
            self.default = if timestamp > 0 {
                settings
                    .display(timestamp)
                    .map_or(Value::Null, Value::String)
            } else {
                Value::String(String::new())
            };
            self.value = self.default.clone();
        }
        self.picker = Some(settings.clone());
    }

    pub(crate) fn bind(&mut self, value: Value) {
        self.value = value;
    }

    pub(crate) fn mark_invalid(&mut self, message: impl Into<String>) {
        self.state = FieldState::Invalid(message.into());
    }

    pub(crate) fn trim(&mut self) {
        if !self.kind.is_text_like() {
            return;
        }
        if let Value::String(text) = &mut self.value {
            let trimmed = text.trim();
            if trimmed.len() != text.len() {
                *text = trimmed.to_string();
            }
        }
    }

    /// Run built-in checks (when submitted), rules, then caller errors.
    ///
    /// The first failure becomes the field's message.
    pub(crate) fn validate(&mut self, submitted: bool) {
        let failure = submitted
            .then(|| self.builtin_failure())
            .flatten()
            .map(str::to_string)
            .or_else(|| {
                self.rules
                    .iter()
                    .find_map(|rule| rule.evaluate(&self.value).err())
                    .map(str::to_string)
            })
            .or_else(|| self.errors.first().cloned());

        self.state = match failure {
            Some(message) => FieldState::Invalid(message),
            None => FieldState::Valid,
        };
    }

    fn builtin_failure(&self) -> Option<&'static str> {
        if !is_filled(&self.value) {
            return None;
        }
        match &self.kind {
            FieldKind::Text {
                max_length: Some(max),
            }
            | FieldKind::Password {
                max_length: Some(max),
            } => self
                .value
                .as_str()
                .filter(|text| text.chars().count() > *max)
                .map(|_| TOO_LONG),
            FieldKind::Radiobutton { options } | FieldKind::Dropdown { options, .. } => {
                let all_offered = match &self.value {
                    Value::String(choice) => offers(options, choice),
                    Value::Array(choices) => choices
                        .iter()
                        .all(|c| c.as_str().is_some_and(|c| offers(options, c))),
                    _ => false,
                };
                (!all_offered).then_some(INVALID_OPTION)
            }
            FieldKind::MultiCheckbox { options } => {
                let all_offered = self.value.as_array().is_some_and(|choices| {
                    choices
                        .iter()
                        .all(|c| c.as_str().is_some_and(|c| offers(options, c)))
                });
                (!all_offered).then_some(INVALID_OPTION)
            }
            FieldKind::Date { .. } => self.date_value().is_none().then_some(INVALID_DATE),
            FieldKind::Time => {
                let parsed = self
                    .value
                    .as_str()
                    .and_then(|t| NaiveTime::parse_from_str(t.trim(), "%H:%M").ok());
                parsed.is_none().then_some(INVALID_TIME)
            }
            _ => None,
        }
    }
}

fn offers(options: &[(String, String)], choice: &str) -> bool {
    options.iter().any(|(value, _)| value == choice)
}

fn join_classes(first: &str, second: &str) -> String {
    match (first.trim(), second.trim()) {
        ("", s) => s.to_string(),
        (f, "") => f.to_string(),
        (f, s) => format!("{f} {s}"),
    }
}
