//! Backend form builder.
//!
//! Forms are built per request from a [`RequestContext`](crate::context::RequestContext)
//! and rendered through the same Tera pipeline as every backend page.
//! The form layer provides:
//! - Typed fields with the backend's class and markup conventions
//! - Date pickers constrained to a start date, an end date, or a range
//! - Submission detection, value binding, and validation rules
//! - Anti-forgery tokens bound to the session
//! - Rich-text editors that register their scripts with the page header

mod builder;
pub mod csrf;
mod date;
mod error;
mod render;
mod rule;
mod types;

pub use builder::{DEFAULT_EXCLUDED, FormBuilder, FormOptions, FormView, TOKEN_MISMATCH};
pub use date::{DateMode, DatePickerSettings, iso_date};
pub use error::FormError;
pub use render::{camel_case, html_escape};
pub use rule::{Rule, is_filled};
pub use types::{
    ButtonType, Field, FieldKind, FieldState, FormMethod, INVALID_DATE, INVALID_OPTION,
    INVALID_TIME, TEXT_MAX_LENGTH, TOO_LONG,
};
