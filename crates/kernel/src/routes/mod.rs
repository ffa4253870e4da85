//! HTTP route handlers.

pub mod health;
pub mod helpers;
pub mod locale;
pub mod search;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::session;
use crate::state::AppState;

/// Build the application router with its session and tracing layers.
pub fn app(state: AppState) -> Router {
    let session_layer = session::create_session_layer(state.config().cookie_secure);

    Router::new()
        .merge(health::router())
        .merge(search::router())
        .merge(locale::router())
        // Middleware layers (last added = first executed in request flow):
        // TraceLayer → session → routes
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
