//! Validation rules callers attach to fields.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

/// Loose e-mail shape check: something@something.tld, no whitespace.
///
/// # Panics
///
/// Panics if the hard-coded regex literal is invalid (impossible in practice).
#[allow(clippy::expect_used)]
static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid regex literal")
});

/// Predicate used by [`Rule::Custom`].
pub type Check = Box<dyn Fn(&Value) -> bool + Send + Sync>;

/// A rule evaluated on every validation pass.
///
/// Apart from [`Rule::Filled`], rules only judge values that are filled in;
/// an empty optional field passes them.
pub enum Rule {
    /// The value must not be empty.
    Filled { message: String },

    /// Text must not be longer than `max` characters.
    MaxLength { max: usize, message: String },

    /// Text must look like an e-mail address.
    Email { message: String },

    /// Text must parse as a whole number.
    Integer { message: String },

    /// Caller-supplied predicate.
    Custom { check: Check, message: String },
}

impl Rule {
    pub fn filled(message: impl Into<String>) -> Self {
        Self::Filled {
            message: message.into(),
        }
    }

    pub fn max_length(max: usize, message: impl Into<String>) -> Self {
        Self::MaxLength {
            max,
            message: message.into(),
        }
    }

    pub fn email(message: impl Into<String>) -> Self {
        Self::Email {
            message: message.into(),
        }
    }

    pub fn integer(message: impl Into<String>) -> Self {
        Self::Integer {
            message: message.into(),
        }
    }

    pub fn custom(
        check: impl Fn(&Value) -> bool + Send + Sync + 'static,
        message: impl Into<String>,
    ) -> Self {
        Self::Custom {
            check: Box::new(check),
            message: message.into(),
        }
    }

    /// Evaluate the rule, returning the failure message.
    pub(crate) fn evaluate(&self, value: &Value) -> Result<(), &str> {
        let filled = is_filled(value);
        match self {
            Self::Filled { message } if !filled => Err(message.as_str()),
            Self::Filled { .. } => Ok(()),
            _ if !filled => Ok(()),
            Self::MaxLength { max, message } => match value.as_str() {
                Some(text) if text.chars().count() > *max => Err(message.as_str()),
                _ => Ok(()),
            },
            Self::Email { message } => match value.as_str() {
                Some(text) if EMAIL.is_match(text.trim()) => Ok(()),
                _ => Err(message.as_str()),
            },
            Self::Integer { message } => match value {
                Value::Number(n) if n.is_i64() || n.is_u64() => Ok(()),
                Value::String(text) if text.trim().parse::<i64>().is_ok() => Ok(()),
                _ => Err(message.as_str()),
            },
            Self::Custom { check, message } => {
                if check(value) {
                    Ok(())
                } else {
                    Err(message.as_str())
                }
            }
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Filled { message } => f.debug_struct("Filled").field("message", message).finish(),
            Self::MaxLength { max, message } => f
                .debug_struct("MaxLength")
                .field("max", max)
                .field("message", message)
                .finish(),
            Self::Email { message } => f.debug_struct("Email").field("message", message).finish(),
            Self::Integer { message } => {
                f.debug_struct("Integer").field("message", message).finish()
            }
            Self::Custom { message, .. } => {
                f.debug_struct("Custom").field("message", message).finish()
            }
        }
    }
}

/// Whether a value counts as filled in.
///
/// Strings must contain something other than whitespace, lists must not be
/// empty, and an unchecked checkbox is empty.
pub fn is_filled(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(checked) => *checked,
        Value::String(text) => !text.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Number(_) => true,
    }
}
