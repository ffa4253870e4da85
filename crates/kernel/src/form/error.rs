//! Configuration errors raised while assembling a form.

use thiserror::Error;

use super::date::DateMode;

/// Errors raised when a form is assembled incorrectly.
///
/// These are programmer mistakes, not user input problems: validation
/// failures are recorded on the fields themselves and never surface here.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("field name cannot be empty")]
    EmptyName,

    #[error("a field named \"{0}\" is already registered on this form")]
    DuplicateName(String),

    #[error(
        "submit buttons cannot be named \"{0}\": the client replaces them with a link keyed on that name"
    )]
    ReservedName(String),

    #[error("date field \"{field}\" in \"{mode}\" mode is missing a valid bound")]
    MissingBound { field: String, mode: DateMode },

    #[error("editor field \"{0}\" needs an asset header to register its scripts")]
    MissingAssetHeader(String),

    #[error("no field named \"{0}\" on this form")]
    UnknownField(String),
}
