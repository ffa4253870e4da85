//! Theme engine and template rendering.
//!
//! Backend pages are Tera templates loaded from the templates directory.

mod engine;

pub use engine::ThemeEngine;
