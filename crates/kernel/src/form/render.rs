//! Field markup and template variable naming.

use std::fmt::Write;

use serde_json::Value;

use super::types::{Field, FieldKind};

/// Value posted for a checked single checkbox.
pub const CHECKBOX_ON: &str = "Y";

/// Camel-case an underscore-separated name.
///
/// Every segment gets an upper-case first letter; with `lower_first` the
/// result starts lower-case again (`search_edit_synonym` → `searchEditSynonym`).
pub fn camel_case(input: &str, lower_first: bool) -> String {
    let mut out = String::with_capacity(input.len());
    for segment in input.split('_').filter(|s| !s.is_empty()) {
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    if lower_first {
        let mut chars = out.chars();
        if let Some(first) = chars.next() {
            return first.to_lowercase().chain(chars).collect();
        }
    }
    out
}

/// HTML-escape a string for safe output.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

impl Field {
    /// DOM id of the input (`post_title` → `postTitle`).
    pub fn dom_id(&self) -> String {
        camel_case(self.name(), true)
    }

    /// Template variable holding the markup (`txtPostTitle`, `ddmLanguage`, ...).
    pub fn template_key(&self) -> String {
        let prefix = match self.kind() {
            FieldKind::Text { .. }
            | FieldKind::Textarea
            | FieldKind::Password { .. }
            | FieldKind::Editor
            | FieldKind::Date { .. }
            | FieldKind::Time => "txt",
            FieldKind::Checkbox | FieldKind::MultiCheckbox { .. } => "chk",
            FieldKind::Radiobutton { .. } => "rbt",
            FieldKind::Dropdown { .. } => "ddm",
            FieldKind::File | FieldKind::Image => "file",
            FieldKind::Button { .. } => "btn",
            FieldKind::Hidden => "hid",
        };
        format!("{prefix}{}", camel_case(self.name(), false))
    }

    /// Error markup, empty when the field is not invalid.
    pub fn error_markup(&self) -> String {
        self.error()
            .map(|message| format!(r#"<span class="formError">{}</span>"#, html_escape(message)))
            .unwrap_or_default()
    }

    /// Render the input element(s).
    pub fn markup(&self) -> String {
        let name = html_escape(self.name());
        let id = html_escape(&self.dom_id());
        let class = html_escape(&self.effective_class());
        let attrs = self.extra_attributes();
        let text = html_escape(&display_text(self.get_value()));

        match self.kind() {
            FieldKind::Text { max_length } | FieldKind::Password { max_length } => {
                let input_type = if matches!(self.kind(), FieldKind::Password { .. }) {
                    "password"
                } else {
                    "text"
                };
                let max = max_length
                    .map(|m| format!(r#" maxlength="{m}""#))
                    .unwrap_or_default();
                format!(
                    r#"<input type="{input_type}" id="{id}" name="{name}" value="{text}"{max} class="{class}"{attrs} />"#
                )
            }
            FieldKind::Date { .. } => format!(
                r#"<input type="text" id="{id}" name="{name}" value="{text}" maxlength="10" class="{class}"{attrs} />"#
            ),
            FieldKind::Time => format!(
                r#"<input type="text" id="{id}" name="{name}" value="{text}" maxlength="5" class="{class}"{attrs} />"#
            ),
            FieldKind::Textarea | FieldKind::Editor => format!(
                r#"<textarea id="{id}" name="{name}" cols="62" rows="5" class="{class}"{attrs}>{text}</textarea>"#
            ),
            FieldKind::Checkbox => {
                let checked = checked_attr(self.is_checked());
                format!(
                    r#"<input type="checkbox" id="{id}" name="{name}" value="{CHECKBOX_ON}" class="{class}"{checked}{attrs} />"#
                )
            }
            FieldKind::MultiCheckbox { options } => {
                self.choice_list("checkbox", &format!("{name}[]"), options)
            }
            FieldKind::Radiobutton { options } => self.choice_list("radio", &name, options),
            FieldKind::Dropdown { options, multiple } => {
                let (select_name, multiple_attr) = if *multiple {
                    (format!("{name}[]"), r#" multiple="multiple""#)
                } else {
                    (name.clone(), "")
                };
                let mut html = format!(
                    r#"<select id="{id}" name="{select_name}" class="{class}"{multiple_attr}{attrs}>"#
                );
                for (value, label) in options {
                    let selected = if self.has_choice(value) {
                        r#" selected="selected""#
                    } else {
                        ""
                    };
                    // SAFETY: write!() to String is infallible
                    #[allow(clippy::unwrap_used)]
                    write!(
                        html,
                        r#"<option value="{}"{selected}>{}</option>"#,
                        html_escape(value),
                        html_escape(label)
                    )
                    .unwrap();
                }
                html.push_str("</select>");
                html
            }
            FieldKind::File => format!(
                r#"<input type="file" id="{id}" name="{name}" class="{class}"{attrs} />"#
            ),
            FieldKind::Image => format!(
                r#"<input type="file" accept="image/*" id="{id}" name="{name}" class="{class}"{attrs} />"#
            ),
            FieldKind::Button { label, button_type } => format!(
                r#"<input type="{}" id="{id}" name="{name}" value="{}" class="{class}"{attrs} />"#,
                button_type.as_str(),
                html_escape(label)
            ),
            FieldKind::Hidden => format!(
                r#"<input type="hidden" id="{id}" name="{name}" value="{text}"{attrs} />"#
            ),
        }
    }

    fn choice_list(&self, input_type: &str, input_name: &str, options: &[(String, String)]) -> String {
        let class = html_escape(&self.effective_class());
        let mut html = String::new();
        for (index, (value, label)) in options.iter().enumerate() {
            let id = format!("{}{}", html_escape(&self.dom_id()), camel_case(value, false));
            let checked = checked_attr(self.has_choice(value));
            // SAFETY: write!() to String is infallible
            #[allow(clippy::unwrap_used)]
            write!(
                html,
                r#"<label for="{id}"><input type="{input_type}" id="{id}" name="{input_name}" value="{}" class="{class}"{checked} /> {}</label>"#,
                html_escape(value),
                html_escape(label)
            )
            .unwrap();
            if index + 1 < options.len() {
                html.push('\n');
            }
        }
        html
    }

    fn has_choice(&self, option: &str) -> bool {
        match self.get_value() {
            Value::String(choice) => choice == option,
            Value::Array(choices) => choices.iter().any(|c| c.as_str() == Some(option)),
            _ => false,
        }
    }

    /// Class plus error class once the field failed validation.
    fn effective_class(&self) -> String {
        if self.is_invalid() && !self.error_class_name().is_empty() {
            format!("{} {}", self.class_name(), self.error_class_name())
                .trim()
                .to_string()
        } else {
            self.class_name().to_string()
        }
    }

    fn extra_attributes(&self) -> String {
        let mut out = String::new();
        for (key, value) in self.attributes() {
            // SAFETY: write!() to String is infallible
            #[allow(clippy::unwrap_used)]
            write!(out, r#" {}="{}""#, html_escape(key), html_escape(value)).unwrap();
        }
        out
    }
}

fn checked_attr(checked: bool) -> &'static str {
    if checked { r#" checked="checked""# } else { "" }
}

fn display_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Bool(_) | Value::Array(_) | Value::Object(_) => String::new(),
        Value::Number(n) => n.to_string(),
    }
}
