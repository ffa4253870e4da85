//! Atrium CMS Kernel Library
//!
//! Backend form builder, request context, asset header, and the backend
//! routes built on them (synonym editing, translation saving). The main
//! entry point for running the server is the `atrium` binary.

pub mod config;
pub mod context;
pub mod error;
pub mod form;
pub mod header;
pub mod locale;
pub mod routes;
pub mod search;
pub mod session;
pub mod state;
pub mod theme;
