use super::{handlers, state::AppState};
use axum::{
    http::{header, HeaderValue},
    routing::{get, post},
    Router,
};
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

/// Chat replies are per-request and must never be served from a cache.
const NO_STORE: &str = "no-store, no-cache, must-revalidate, private, max-age=0";

/// Creates the Axum router with all the application routes.
pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route("/chat", post(handlers::chat_handler))
        .route("/get", post(handlers::rules_handler))
        .route("/kb/reload", post(handlers::reload_handler))
        .with_state(app_state)
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static(NO_STORE),
        ))
        .layer(TraceLayer::new_for_http())
}
